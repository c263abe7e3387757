//! Error type for the HTTP boundary.
//!
//! [`ApiError`] unifies handler failures into one enum with an
//! [`IntoResponse`] implementation so handlers can return `Result<_, ApiError>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors surfaced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The engine lock was poisoned by a panicking holder.
    #[error("failed to lock simulation state")]
    Lock,

    /// The request carried a value the engine must not see.
    #[error("invalid request: {0}")]
    InvalidInput(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Lock => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Self::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
