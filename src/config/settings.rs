//! Runtime settings for the order service.
//!
//! Everything is read from environment variables (optionally populated from `.env`
//! by `dotenvy` in `main`). Secrets such as `SENDGRID_API_KEY` stay optional: without
//! a key, order emails are written to the log instead of being sent.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CATALOG_PATH: &str = "catalog.toml";
const DEFAULT_NOTIFICATION_EMAIL: &str = "orders@bakery.com";
const DEFAULT_NOTIFICATION_FROM: &str = "noreply@bakeryapp.com";

/// Where order notifications go and how they are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Recipient of new-order emails
    pub to: String,
    /// Sender address
    pub from: String,
    /// `SendGrid` API key; `None` means log-only delivery
    pub sendgrid_api_key: Option<String>,
}

/// Application settings assembled at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Interface to bind the HTTP server on
    pub host: String,
    /// Port to bind the HTTP server on
    pub port: u16,
    /// `SeaORM` connection string
    pub database_url: String,
    /// Path to the seed catalog
    pub catalog_path: String,
    /// Notification delivery settings
    pub notification: NotificationSettings,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| Error::Config {
                message: format!("PORT must be a number between 0 and 65535, got '{raw}': {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            catalog_path: non_empty("CATALOG_PATH")
                .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string()),
            notification: NotificationSettings {
                to: non_empty("NOTIFICATION_EMAIL")
                    .unwrap_or_else(|| DEFAULT_NOTIFICATION_EMAIL.to_string()),
                from: non_empty("NOTIFICATION_FROM")
                    .unwrap_or_else(|| DEFAULT_NOTIFICATION_FROM.to_string()),
                sendgrid_api_key: non_empty("SENDGRID_API_KEY"),
            },
        })
    }

    /// Socket address for the HTTP listener.
    ///
    /// # Errors
    /// Returns an error if `host:port` does not parse as a socket address.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config {
                message: format!("Invalid server address {}:{}: {e}", self.host, self.port),
            })
    }
}
