use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shortcut_auth::AuthError;
use shortcut_shortener::ShortenerError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures surfaced to HTTP clients.
///
/// Server-side failures are logged in full and answered with a generic
/// body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        match value {
            ShortenerError::InvalidUrl(message) => Self::BadRequest(message),
            ShortenerError::NotFound(_) | ShortenerError::Deleted(_) => Self::NotFound,
            ShortenerError::Storage(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Internal(format!("cannot encode auth cookie: {value}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::Internal(message) => {
                error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
