use crate::signal::{ErrorSignal, Exception};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attributes carried into the error-page dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorAttributes {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub path: String,
}

impl ErrorAttributes {
    pub fn new(status: StatusCode, path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            exception: None,
            message: None,
            path: path.into(),
        }
    }

    /// Attributes for a signal that reached the error-page dispatch.
    ///
    /// Raised exceptions become a 500; explicit statuses keep their own.
    pub fn from_signal(signal: &ErrorSignal, path: impl Into<String>) -> Self {
        match signal {
            ErrorSignal::ExceptionRaised(exception) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, path).with_exception(exception)
            }
            ErrorSignal::ExplicitStatus { status, message } => {
                Self::new(*status, path).with_message(message.clone())
            }
        }
    }

    pub fn with_exception(mut self, exception: &Exception) -> Self {
        self.exception = Some(exception.type_name().to_owned());
        self.message = exception.message().map(str::to_owned);
        self
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Drop exception detail so it is safe to show to any caller.
    ///
    /// Messages of explicit statuses were chosen by the handler and are kept.
    pub fn redacted(mut self) -> Self {
        if self.exception.take().is_some() {
            self.message = None;
        }
        self
    }
}
