use super::ExceptionAdvice;
use crate::resolver::{HandlerExceptionResolver, RequestInfo, ResolutionOutcome, ResponseState};
use crate::scope::PathScope;
use crate::signal::Exception;
use std::sync::Arc;

/// Exposes an [`ExceptionAdvice`] as the highest-priority resolver.
///
/// Outside its scope the advice is never consulted and the resolver
/// declines. Inside it, every exception is handled.
#[derive(Debug, Clone)]
pub struct AdviceResolver {
    advice: Arc<ExceptionAdvice>,
    scope: PathScope,
}

impl AdviceResolver {
    pub fn new(advice: ExceptionAdvice, scope: PathScope) -> Self {
        Self {
            advice: Arc::new(advice),
            scope,
        }
    }

    /// The default advice table applied under `base_path`
    pub fn for_base_path(base_path: &str) -> Self {
        Self::new(ExceptionAdvice::default(), PathScope::prefix(base_path))
    }

    pub fn scope(&self) -> &PathScope {
        &self.scope
    }
}

impl HandlerExceptionResolver for AdviceResolver {
    fn name(&self) -> &str {
        "AdviceResolver"
    }

    fn resolve(
        &self,
        request: &RequestInfo,
        _response: &mut ResponseState,
        exception: &Exception,
    ) -> ResolutionOutcome {
        if !self.scope.matches(request.path()) {
            return ResolutionOutcome::Unhandled;
        }
        let (status, body) = self.advice.classify(exception);
        ResolutionOutcome::handled(status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorResult;
    use axum::http::{Method, StatusCode, Uri};

    fn request(path: &'static str) -> RequestInfo {
        RequestInfo::new(Method::GET, Uri::from_static(path))
    }

    #[test]
    fn test_declines_outside_scope() {
        let resolver = AdviceResolver::for_base_path("/api");
        for path in ["/error-ex", "/apis/members", "/members/api"] {
            let outcome = resolver.resolve(
                &request(path),
                &mut ResponseState::new(),
                &Exception::runtime("db down"),
            );
            assert_eq!(outcome, ResolutionOutcome::Unhandled, "path {path}");
        }
    }

    #[test]
    fn test_handles_everything_inside_scope() {
        let resolver = AdviceResolver::for_base_path("/api");
        let outcome = resolver.resolve(
            &request("/api/members/ex"),
            &mut ResponseState::new(),
            &Exception::runtime("db down"),
        );
        assert_eq!(
            outcome,
            ResolutionOutcome::handled(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResult::new("EX", "internal error")
            )
        );
    }

    #[test]
    fn test_does_not_touch_response_state() {
        let resolver = AdviceResolver::for_base_path("/api");
        let mut response = ResponseState::new();
        resolver.resolve(
            &request("/api/members/bad"),
            &mut response,
            &Exception::illegal_argument("bad id"),
        );
        assert!(!response.is_committed());
    }
}
