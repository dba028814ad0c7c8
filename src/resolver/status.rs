use super::{HandlerExceptionResolver, RequestInfo, ResolutionOutcome, ResponseState};
use crate::common::ErrorResult;
use crate::signal::{Exception, ExceptionKind};
use axum::http::StatusCode;

pub const BAD_REQUEST_CODE: &str = "BAD";

/// Map an exception to a status and body, or `None` to defer.
///
/// Only [`ExceptionKind::IllegalArgument`] is classified here.
pub fn classify(exception: &Exception) -> Option<(StatusCode, ErrorResult)> {
    match exception.kind() {
        ExceptionKind::IllegalArgument => Some((
            StatusCode::BAD_REQUEST,
            ErrorResult::new(BAD_REQUEST_CODE, exception.message().unwrap_or_default()),
        )),
        ExceptionKind::User | ExceptionKind::Unclassified => None,
    }
}

/// Turns illegal-argument exceptions into a raw 400.
///
/// The status is sent on the response directly and nothing is rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct IllegalArgumentResolver;

impl HandlerExceptionResolver for IllegalArgumentResolver {
    fn name(&self) -> &str {
        "IllegalArgumentResolver"
    }

    fn resolve(
        &self,
        _request: &RequestInfo,
        response: &mut ResponseState,
        exception: &Exception,
    ) -> ResolutionOutcome {
        let Some((status, body)) = classify(exception) else {
            return ResolutionOutcome::Unhandled;
        };

        tracing::info!("IllegalArgument resolved to {}", status.as_u16());
        match response.send_error(status, Some(body.message)) {
            Ok(()) => ResolutionOutcome::status_only(status),
            Err(err) => {
                // Fail open: the next resolver gets its chance.
                tracing::error!(error = %err, "Failed to send resolved status");
                ResolutionOutcome::Unhandled
            }
        }
    }
}
