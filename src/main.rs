use dotenvy::dotenv;
use forno::{
    api::{self, AppState},
    config::{
        catalog::load_catalog,
        database::{create_connection, create_tables, ensure_sqlite_dir},
        settings::Settings,
    },
    core::product::seed_products,
    errors::Result,
};
use std::path::Path;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;
    if settings.notification.sendgrid_api_key.is_none() {
        warn!("SENDGRID_API_KEY not set, order emails will only be logged");
    }

    // 4. Initialize database
    ensure_sqlite_dir(&settings.database_url)?;
    let db = create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the catalog on first start
    if Path::new(&settings.catalog_path).exists() {
        let catalog = load_catalog(&settings.catalog_path)?;
        seed_products(&db, &catalog)
            .await
            .inspect_err(|e| error!("Failed to seed products: {}", e))?;
    } else {
        warn!(path = %settings.catalog_path, "Catalog file not found, skipping product seed");
    }

    // 6. Serve
    let address = settings.bind_address()?;
    let listener = TcpListener::bind(address)
        .await
        .inspect_err(|e| error!("Failed to bind to address {}: {}", address, e))?;
    info!("Listening on {}", listener.local_addr()?);

    api::serve(listener, AppState::new(db, &settings), shutdown_signal())
        .await
        .inspect_err(|e| error!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Completes on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
