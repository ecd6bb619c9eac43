//! HTTP API - axum router, handlers and wire types.
//!
//! Routes:
//! - `GET /health`
//! - `GET /api/products`, `POST /api/products`
//! - `GET /api/products/{id}`, `PATCH /api/products/{id}`
//! - `GET /api/orders`, `POST /api/orders`
//! - `GET /api/orders/{id}`, `PATCH /api/orders/{id}`

pub mod client;
pub mod dto;
pub mod error;
pub mod handlers;

use crate::{
    config::settings::Settings,
    core::{notification::Mailer, submission::OrderService},
};
use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use std::{future::Future, io};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use client::ApiClient;
pub use error::{ApiError, ApiErrorResponse, FieldError};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Order placement plus notification
    pub orders: OrderService<Mailer>,
}

impl AppState {
    /// Builds the state from a connection and the runtime settings.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: &Settings) -> Self {
        let mailer = Mailer::from_settings(&settings.notification);
        Self {
            orders: OrderService::new(db.clone(), mailer, settings.notification.clone()),
            db,
        }
    }
}

/// Builds the application router with tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/products/{id}",
            get(handlers::get_product).patch(handlers::update_product),
        )
        .route(
            "/api/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route(
            "/api/orders/{id}",
            get(handlers::get_order).patch(handlers::update_order_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` completes.
///
/// # Errors
/// Returns the I/O error that stopped the server.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
