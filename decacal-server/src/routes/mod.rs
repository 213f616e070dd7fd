pub mod calendar;
pub mod events;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use decacal_core::DecacalError;
use serde::Serialize;
use tracing::error;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Convert core errors to HTTP responses
pub struct AppError(DecacalError);

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DecacalError::InvalidDate(_) | DecacalError::Validation(_) => StatusCode::BAD_REQUEST,
            DecacalError::NotFound(_) => StatusCode::NOT_FOUND,
            DecacalError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            DecacalError::Backend(_)
            | DecacalError::CorruptState(_)
            | DecacalError::Config(_)
            | DecacalError::Io(_)
            | DecacalError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = Json(ErrorResponse {
            detail: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<DecacalError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
