use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Structured error body returned to API callers
///
/// This is the only wire payload the exception classifiers produce.
///
/// # Example
/// ```
/// use faultline::common::ErrorResult;
///
/// let body = ErrorResult::new("BAD", "bad id");
/// assert_eq!(
///     serde_json::to_string(&body).unwrap(),
///     r#"{"code":"BAD","message":"bad id"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorResult {
    pub code: String,
    pub message: String,
}

impl ErrorResult {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Pair the body with a status to produce an HTTP response
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
