use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Order must include at least one item")]
    EmptyCart,

    #[error("Product not found: {id}")]
    ProductNotFound { id: i64 },

    #[error("Order not found: {id}")]
    OrderNotFound { id: i64 },

    #[error("Cannot move order from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Notification error: {message}")]
    Notification { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Order service rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },
}

impl Error {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error is the caller's fault and nothing was persisted.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::Validation { .. }
                | Self::EmptyCart
                | Self::InvalidStatusTransition { .. }
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
