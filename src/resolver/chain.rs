use super::{HandlerExceptionResolver, RequestInfo, ResolutionOutcome, ResponseState};
use crate::signal::Exception;
use std::sync::Arc;

/// An ordered, read-only list of resolvers.
///
/// Priority is registration order. The chain is assembled once through
/// [`ResolverChainBuilder`] and never reordered afterwards.
///
/// # Example
/// ```
/// use faultline::resolver::{IllegalArgumentResolver, ResolverChain, UserExceptionResolver};
///
/// let chain = ResolverChain::builder()
///     .register(IllegalArgumentResolver)
///     .register(UserExceptionResolver)
///     .build();
/// assert_eq!(chain.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ResolverChain {
    resolvers: Arc<Vec<Arc<dyn HandlerExceptionResolver>>>,
}

impl ResolverChain {
    pub fn builder() -> ResolverChainBuilder {
        ResolverChainBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolver names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Consult resolvers in priority order until one returns a terminal outcome.
    ///
    /// Never returns [`ResolutionOutcome::Unhandled`]: if every resolver
    /// declines, the exception propagates.
    pub fn resolve(
        &self,
        request: &RequestInfo,
        response: &mut ResponseState,
        exception: &Exception,
    ) -> ResolutionOutcome {
        tracing::error!(
            exception = %exception,
            kind = %exception.kind(),
            causes = ?exception.causes(),
            method = %request.method(),
            path = request.path(),
            dispatch_type = %request.dispatch_type(),
            "Resolving exception"
        );

        for resolver in self.resolvers.iter() {
            let outcome = resolver.resolve(request, response, exception);
            if outcome.is_terminal() {
                tracing::debug!(resolver = resolver.name(), ?outcome, "Exception resolved");
                return outcome;
            }
            tracing::trace!(resolver = resolver.name(), "Resolver declined");
        }

        tracing::debug!(path = request.path(), "No resolver classified the exception");
        ResolutionOutcome::Propagate
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.names())
            .finish()
    }
}

/// Append-only registration used at startup
#[derive(Default)]
pub struct ResolverChainBuilder {
    resolvers: Vec<Arc<dyn HandlerExceptionResolver>>,
}

impl ResolverChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: HandlerExceptionResolver>(mut self, resolver: R) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn build(self) -> ResolverChain {
        ResolverChain {
            resolvers: Arc::new(self.resolvers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorResult;
    use crate::resolver::IllegalArgumentResolver;
    use axum::http::{Method, StatusCode, Uri};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        code: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl HandlerExceptionResolver for Fixed {
        fn resolve(
            &self,
            _request: &RequestInfo,
            _response: &mut ResponseState,
            exception: &Exception,
        ) -> ResolutionOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ResolutionOutcome::handled(
                StatusCode::CONFLICT,
                ErrorResult::new(self.code, exception.message().unwrap_or_default()),
            )
        }
    }

    struct Declines;

    impl HandlerExceptionResolver for Declines {
        fn resolve(
            &self,
            _request: &RequestInfo,
            _response: &mut ResponseState,
            _exception: &Exception,
        ) -> ResolutionOutcome {
            ResolutionOutcome::Unhandled
        }
    }

    struct Stops;

    impl HandlerExceptionResolver for Stops {
        fn resolve(
            &self,
            _request: &RequestInfo,
            _response: &mut ResponseState,
            _exception: &Exception,
        ) -> ResolutionOutcome {
            ResolutionOutcome::Propagate
        }
    }

    fn request(path: &'static str) -> RequestInfo {
        RequestInfo::new(Method::GET, Uri::from_static(path))
    }

    #[test]
    fn test_earlier_resolver_wins() {
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let chain = ResolverChain::builder()
            .register(Fixed {
                code: "FIRST",
                calls: first_calls.clone(),
            })
            .register(Fixed {
                code: "SECOND",
                calls: second_calls.clone(),
            })
            .build();

        let outcome = chain.resolve(
            &request("/members"),
            &mut ResponseState::new(),
            &Exception::runtime("conflict"),
        );

        assert_eq!(
            outcome,
            ResolutionOutcome::handled(StatusCode::CONFLICT, ErrorResult::new("FIRST", "conflict"))
        );
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_declined_falls_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = ResolverChain::builder()
            .register(Declines)
            .register(Fixed {
                code: "LATE",
                calls: calls.clone(),
            })
            .build();

        let outcome = chain.resolve(
            &request("/members"),
            &mut ResponseState::new(),
            &Exception::runtime("x"),
        );
        assert!(matches!(outcome, ResolutionOutcome::Handled { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_propagate_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = ResolverChain::builder()
            .register(Stops)
            .register(Fixed {
                code: "NEVER",
                calls: calls.clone(),
            })
            .build();

        let outcome = chain.resolve(
            &request("/members"),
            &mut ResponseState::new(),
            &Exception::runtime("x"),
        );
        assert_eq!(outcome, ResolutionOutcome::Propagate);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unclassified_propagates() {
        let chain = ResolverChain::builder()
            .register(Declines)
            .register(IllegalArgumentResolver)
            .build();

        let outcome = chain.resolve(
            &request("/error-ex"),
            &mut ResponseState::new(),
            &Exception::runtime("boom"),
        );
        assert_eq!(outcome, ResolutionOutcome::Propagate);
    }

    #[test]
    fn test_empty_chain_propagates() {
        let chain = ResolverChain::default();
        assert!(chain.is_empty());
        assert_eq!(
            chain.resolve(
                &request("/"),
                &mut ResponseState::new(),
                &Exception::illegal_argument("bad id"),
            ),
            ResolutionOutcome::Propagate
        );
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let chain = ResolverChain::builder()
            .register(IllegalArgumentResolver)
            .build();
        let exception = Exception::illegal_argument("bad id");

        let first = chain.resolve(&request("/illegal"), &mut ResponseState::new(), &exception);
        let second = chain.resolve(&request("/illegal"), &mut ResponseState::new(), &exception);
        assert_eq!(first, second);
    }
}
