use crate::services::inventory_service::InventoryError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for request errors that keeps the message local.
///
/// Every failure leaves the service as `{"error": <message>}` with the
/// mapped status code; storage and I/O failures are logged in full and
/// reported to the client as a generic internal error.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        let status = match &err {
            InventoryError::MissingName
            | InventoryError::NoUpdateFields
            | InventoryError::MissingPhoto
            | InventoryError::NotAnImage(_)
            | InventoryError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            InventoryError::ItemNotFound(_) | InventoryError::PhotoNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            InventoryError::Sqlx(_) | InventoryError::Io(_) => {
                tracing::error!("internal failure handling request: {}", err);
                return AppError::internal("internal server error");
            }
        };
        AppError::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("internal failure handling request: {:#}", err);
        AppError::internal("internal server error")
    }
}
