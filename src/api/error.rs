//! API error handling.
//!
//! Domain [`Error`]s are mapped onto status codes here. Validation failures become 400
//! with a field list, unknown ids become 404, and everything else is logged and answered
//! with a generic 500 message so internal details never reach the client.

use crate::errors::Error;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub message: String,
    /// Field-level errors for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation
    pub field: String,
    /// Error message for this field
    pub message: String,
}

/// Status code plus body, ready to be returned from a handler.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Error details
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiError {
                message: message.into(),
                errors: None,
            },
        }
    }

    /// Creates a 400 response listing the offending fields.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError {
                message: message.into(),
                errors: Some(details),
            },
        }
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 500 response and logs the cause.
    #[must_use]
    pub fn internal_error(message: impl Into<String>, cause: &Error) -> Self {
        let message = message.into();
        tracing::error!(error = %cause, "{message}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Maps a domain error, using `context` as the generic 500 message.
    #[must_use]
    pub fn from_error(error: &Error, context: &str) -> Self {
        match error {
            Error::Validation { field, message } => Self::validation_error(
                error.to_string(),
                vec![FieldError {
                    field: field.clone(),
                    message: message.clone(),
                }],
            ),
            Error::InvalidAmount { .. }
            | Error::EmptyCart
            | Error::InvalidStatusTransition { .. } => {
                Self::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            Error::ProductNotFound { .. } => Self::not_found("Product not found"),
            Error::OrderNotFound { .. } => Self::not_found("Order not found"),
            _ => Self::internal_error(context, error),
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation_error(
            "Invalid request body",
            vec![FieldError {
                field: "body".to_string(),
                message: rejection.body_text(),
            }],
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
