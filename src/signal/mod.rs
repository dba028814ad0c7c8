//! Error signals raised by handlers.
//!
//! A failed request produces exactly one [`ErrorSignal`]: either an
//! [`Exception`] propagated out of the handler, or an [`ExplicitStatus`] the
//! handler chose to send without failing.

use crate::error::{FaultlineError, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;
use std::fmt;
use strum_macros::{AsRefStr, Display};

pub mod kinds;

pub use kinds::{IllegalArgument, UserException};

/// Classification taxonomy for raised exceptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum ExceptionKind {
    /// Invalid input from the caller, message is safe to echo
    #[strum(serialize = "ClientInputError")]
    IllegalArgument,

    /// Business-rule violation, message is safe to echo
    #[strum(serialize = "DomainError")]
    User,

    /// Anything else, message must never reach API callers
    #[strum(serialize = "UnclassifiedError")]
    Unclassified,
}

/// An exception captured from a handler.
///
/// Holds everything the resolvers need (kind, type name, message and the
/// rendered `source()` chain) so it can travel in response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    kind: ExceptionKind,
    type_name: String,
    message: Option<String>,
    causes: Vec<String>,
}

impl Exception {
    pub fn new(kind: ExceptionKind, type_name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            message,
            causes: Vec::new(),
        }
    }

    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::from(IllegalArgument::new(message))
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::from(UserException::new(message))
    }

    /// An unclassified runtime failure
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(
            ExceptionKind::Unclassified,
            "RuntimeError",
            Some(message.into()),
        )
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.type_name, message),
            None => f.write_str(&self.type_name),
        }
    }
}

impl<E> From<E> for Exception
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        let erased: &(dyn Error + 'static) = &err;
        let kind = if erased.is::<IllegalArgument>() {
            ExceptionKind::IllegalArgument
        } else if erased.is::<UserException>() {
            ExceptionKind::User
        } else {
            ExceptionKind::Unclassified
        };

        let mut causes = Vec::new();
        let mut source = erased.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind,
            type_name: short_type_name(std::any::type_name::<E>()).to_string(),
            message: Some(err.to_string()),
            causes,
        }
    }
}

impl IntoResponse for Exception {
    fn into_response(self) -> Response {
        // Provisional 500; the dispatcher layer replaces it once resolved.
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response
            .extensions_mut()
            .insert(ErrorSignal::ExceptionRaised(self));
        response
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A status a handler sends deliberately, bypassing the resolver chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitStatus {
    status: StatusCode,
    message: Option<String>,
}

impl ExplicitStatus {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    pub fn status_only(status: StatusCode) -> Self {
        Self {
            status,
            message: None,
        }
    }

    pub fn from_code(code: u16, message: Option<String>) -> Result<Self> {
        let status = StatusCode::from_u16(code).map_err(|_| FaultlineError::InvalidStatus(code))?;
        Ok(Self { status, message })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl IntoResponse for ExplicitStatus {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(ErrorSignal::ExplicitStatus {
            status: self.status,
            message: self.message,
        });
        response
    }
}

/// The single error signal produced by a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSignal {
    ExceptionRaised(Exception),
    ExplicitStatus {
        status: StatusCode,
        message: Option<String>,
    },
}

impl ErrorSignal {
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            ErrorSignal::ExceptionRaised(exception) => Some(exception),
            ErrorSignal::ExplicitStatus { .. } => None,
        }
    }
}

impl From<Exception> for ErrorSignal {
    fn from(exception: Exception) -> Self {
        ErrorSignal::ExceptionRaised(exception)
    }
}

impl From<ExplicitStatus> for ErrorSignal {
    fn from(explicit: ExplicitStatus) -> Self {
        ErrorSignal::ExplicitStatus {
            status: explicit.status,
            message: explicit.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("db down")]
    struct DatabaseDown {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn test_kind_detected_by_concrete_type() {
        assert_eq!(
            Exception::from(IllegalArgument::new("bad id")).kind(),
            ExceptionKind::IllegalArgument
        );
        assert_eq!(
            Exception::from(UserException::new("no such member")).kind(),
            ExceptionKind::User
        );
        assert_eq!(
            Exception::from(std::io::Error::other("disk")).kind(),
            ExceptionKind::Unclassified
        );
    }

    #[test]
    fn test_cause_chain_captured() {
        let err = DatabaseDown {
            source: std::io::Error::other("connection refused"),
        };
        let exception = Exception::from(err);

        assert_eq!(exception.type_name(), "DatabaseDown");
        assert_eq!(exception.message(), Some("db down"));
        assert_eq!(exception.causes(), ["connection refused".to_string()]);
    }

    #[test]
    fn test_user_exception_source_is_a_cause() {
        let exception = Exception::from(
            UserException::new("quota exceeded").with_source(std::io::Error::other("limit 10")),
        );
        assert_eq!(exception.kind(), ExceptionKind::User);
        assert_eq!(exception.causes(), ["limit 10".to_string()]);
    }

    #[test]
    fn test_kind_display_uses_taxonomy_names() {
        assert_eq!(ExceptionKind::IllegalArgument.to_string(), "ClientInputError");
        assert_eq!(ExceptionKind::User.as_ref(), "DomainError");
        assert_eq!(ExceptionKind::Unclassified.to_string(), "UnclassifiedError");
    }

    #[test]
    fn test_exception_response_carries_signal() {
        let response = Exception::runtime("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let signal = response.extensions().get::<ErrorSignal>().unwrap();
        assert_eq!(signal.exception().unwrap().message(), Some("boom"));
    }

    #[test]
    fn test_explicit_status_response_carries_signal() {
        let response = ExplicitStatus::new(StatusCode::NOT_FOUND, "not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.extensions().get::<ErrorSignal>(),
            Some(&ErrorSignal::ExplicitStatus {
                status: StatusCode::NOT_FOUND,
                message: Some("not found".into()),
            })
        );
    }

    #[test]
    fn test_explicit_status_rejects_invalid_code() {
        assert!(matches!(
            ExplicitStatus::from_code(42, None),
            Err(FaultlineError::InvalidStatus(42))
        ));
        assert_eq!(
            ExplicitStatus::from_code(500, None).unwrap().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
