use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FaultlineError>;

#[derive(Debug, Error)]
pub enum FaultlineError {
    #[error("Response already committed, cannot send status {status}")]
    ResponseCommitted { status: StatusCode },

    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    #[error("Error page dispatch failed: {0}")]
    ErrorPage(String),
}

impl FaultlineError {
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for FaultlineError {
    fn into_response(self) -> axum::response::Response {
        // Internal failures never carry their detail to the client.
        let status = match &self {
            FaultlineError::ResponseCommitted { status } => *status,
            FaultlineError::InvalidStatus(_)
            | FaultlineError::InvalidConfig { .. }
            | FaultlineError::ErrorPage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self, "responding with raw status {}", status);
        status.into_response()
    }
}
