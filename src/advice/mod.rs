//! Centralized exception advice for API paths.
//!
//! An [`ExceptionAdvice`] is a mapping table from exception kind to
//! `(status, ErrorResult)`. Rules are checked in registration order and the
//! table always ends in a catch-all, so classification is total.
//!
//! | Kind              | Status | Code      | Message            |
//! |-------------------|--------|-----------|--------------------|
//! | `IllegalArgument` | 400    | `BAD`     | exception message  |
//! | `User`            | 400    | `USER-EX` | exception message  |
//! | anything else     | 500    | `EX`      | `"internal error"` |

use crate::common::ErrorResult;
use crate::signal::{Exception, ExceptionKind};
use axum::http::StatusCode;

pub mod resolver;

pub use resolver::AdviceResolver;

pub const INTERNAL_ERROR_CODE: &str = "EX";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// Where the body message comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    /// Echo the exception message; only for user-facing kinds
    Exception,
    /// A fixed literal that hides the exception detail
    Fixed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AdviceRule {
    status: StatusCode,
    code: String,
    message: MessageSource,
}

impl AdviceRule {
    fn apply(&self, exception: &Exception) -> (StatusCode, ErrorResult) {
        let message = match &self.message {
            MessageSource::Exception => exception.message().unwrap_or_default().to_owned(),
            MessageSource::Fixed(literal) => literal.clone(),
        };
        (self.status, ErrorResult::new(self.code.clone(), message))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionAdvice {
    rules: Vec<(ExceptionKind, AdviceRule)>,
    fallback: AdviceRule,
}

impl Default for ExceptionAdvice {
    fn default() -> Self {
        Self::builder()
            .on(
                ExceptionKind::IllegalArgument,
                StatusCode::BAD_REQUEST,
                crate::resolver::status::BAD_REQUEST_CODE,
                MessageSource::Exception,
            )
            .on(
                ExceptionKind::User,
                StatusCode::BAD_REQUEST,
                crate::resolver::user::USER_EXCEPTION_CODE,
                MessageSource::Exception,
            )
            .build()
    }
}

impl ExceptionAdvice {
    pub fn builder() -> ExceptionAdviceBuilder {
        ExceptionAdviceBuilder::default()
    }

    /// Classify any exception; the catch-all never echoes the exception message
    pub fn classify(&self, exception: &Exception) -> (StatusCode, ErrorResult) {
        let rule = self
            .rules
            .iter()
            .find(|(kind, _)| *kind == exception.kind())
            .map(|(_, rule)| rule)
            .unwrap_or(&self.fallback);

        tracing::debug!(
            exception_type = exception.type_name(),
            status = rule.status.as_u16(),
            code = %rule.code,
            "[exceptionHandler] classified"
        );
        rule.apply(exception)
    }
}

pub struct ExceptionAdviceBuilder {
    rules: Vec<(ExceptionKind, AdviceRule)>,
    fallback: AdviceRule,
}

impl Default for ExceptionAdviceBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback: AdviceRule {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: INTERNAL_ERROR_CODE.to_owned(),
                message: MessageSource::Fixed(INTERNAL_ERROR_MESSAGE.to_owned()),
            },
        }
    }
}

impl ExceptionAdviceBuilder {
    /// Add a rule. A kind registered twice keeps its first rule.
    pub fn on(
        mut self,
        kind: ExceptionKind,
        status: StatusCode,
        code: impl Into<String>,
        message: MessageSource,
    ) -> Self {
        if self.rules.iter().all(|(existing, _)| *existing != kind) {
            self.rules.push((
                kind,
                AdviceRule {
                    status,
                    code: code.into(),
                    message,
                },
            ));
        }
        self
    }

    /// Replace the catch-all. Its message is always a fixed literal.
    pub fn fallback(
        mut self,
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.fallback = AdviceRule {
            status,
            code: code.into(),
            message: MessageSource::Fixed(message.into()),
        };
        self
    }

    pub fn build(self) -> ExceptionAdvice {
        ExceptionAdvice {
            rules: self.rules,
            fallback: self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let advice = ExceptionAdvice::default();

        assert_eq!(
            advice.classify(&Exception::illegal_argument("bad id")),
            (StatusCode::BAD_REQUEST, ErrorResult::new("BAD", "bad id"))
        );
        assert_eq!(
            advice.classify(&Exception::user("member is locked")),
            (
                StatusCode::BAD_REQUEST,
                ErrorResult::new("USER-EX", "member is locked")
            )
        );
        assert_eq!(
            advice.classify(&Exception::runtime("db down")),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResult::new("EX", "internal error")
            )
        );
    }

    #[test]
    fn test_unclassified_message_never_leaks() {
        let advice = ExceptionAdvice::default();
        for secret in ["db down", "password=hunter2", "internal error"] {
            let exception = Exception::runtime(secret).with_cause("socket closed");
            let (_, body) = advice.classify(&exception);
            assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
            assert_eq!(body.code, INTERNAL_ERROR_CODE);
        }
    }

    #[test]
    fn test_first_rule_for_a_kind_wins() {
        let advice = ExceptionAdvice::builder()
            .on(
                ExceptionKind::User,
                StatusCode::CONFLICT,
                "FIRST",
                MessageSource::Exception,
            )
            .on(
                ExceptionKind::User,
                StatusCode::BAD_REQUEST,
                "SECOND",
                MessageSource::Exception,
            )
            .build();

        let (status, body) = advice.classify(&Exception::user("taken"));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "FIRST");
    }

    #[test]
    fn test_custom_fallback() {
        let advice = ExceptionAdvice::builder()
            .fallback(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", "try again later")
            .build();

        let (status, body) = advice.classify(&Exception::illegal_argument("bad id"));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, ErrorResult::new("UNAVAILABLE", "try again later"));
    }
}
