use super::{HandlerExceptionResolver, RequestInfo, ResolutionOutcome, ResponseState};
use crate::common::ErrorResult;
use crate::signal::{Exception, ExceptionKind};
use axum::http::StatusCode;

pub const USER_EXCEPTION_CODE: &str = "USER-EX";

/// Resolves user exceptions according to what the caller accepts.
///
/// JSON callers get an [`ErrorResult`] body, everyone else a raw 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserExceptionResolver;

impl HandlerExceptionResolver for UserExceptionResolver {
    fn name(&self) -> &str {
        "UserExceptionResolver"
    }

    fn resolve(
        &self,
        request: &RequestInfo,
        response: &mut ResponseState,
        exception: &Exception,
    ) -> ResolutionOutcome {
        if exception.kind() != ExceptionKind::User {
            return ResolutionOutcome::Unhandled;
        }

        let message = exception.message().unwrap_or_default();
        if request.accepts_json() {
            tracing::info!("UserException resolved to JSON 400");
            return ResolutionOutcome::handled(
                StatusCode::BAD_REQUEST,
                ErrorResult::new(USER_EXCEPTION_CODE, message),
            );
        }

        match response.send_error(StatusCode::BAD_REQUEST, Some(message.to_owned())) {
            Ok(()) => ResolutionOutcome::status_only(StatusCode::BAD_REQUEST),
            Err(err) => {
                tracing::error!(error = %err, "Failed to send resolved status");
                ResolutionOutcome::Unhandled
            }
        }
    }
}
