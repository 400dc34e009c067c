//! Error types for the visualization server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use stepwise_playback::PlaybackError;
use thiserror::Error;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or serving.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No scenario saved under this name
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Player task error
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ScenarioNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) | Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::Playback(PlaybackError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Io(_) | Error::Playback(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
