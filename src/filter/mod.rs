//! Filters: cross-cutting concerns that sit outside the dispatcher.
//!
//! Unlike interceptors, a filter is selected by [`DispatchType`]. A filter
//! registered for both `REQUEST` and `ERROR` sees the original request and
//! the error-page re-dispatch, so it can pair what it does across the two.

use crate::dispatch::DispatchType;
use crate::interceptor::{BoxFuture, Next, Stage};
use crate::scope::PathScope;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use std::sync::Arc;

pub mod layer;
pub mod logging;

pub use layer::{FilterLayer, FilterMiddleware};
pub use logging::LogFilter;

#[async_trait]
pub trait Filter: Send + Sync + 'static {
    async fn do_filter(&self, request: Request<Body>, chain: Next) -> Response;
}

/// A filter with its order, URL patterns and dispatch types
#[derive(Clone)]
pub struct FilterRegistration {
    filter: Arc<dyn Filter>,
    order: i32,
    scope: PathScope,
    dispatch_types: Vec<DispatchType>,
}

impl FilterRegistration {
    /// Registers for every path, `REQUEST` dispatches only
    pub fn new<F: Filter>(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
            order: 0,
            scope: PathScope::all(),
            dispatch_types: vec![DispatchType::Request],
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn url_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = PathScope::new().include_all(patterns);
        self
    }

    pub fn dispatch_types(mut self, dispatch_types: impl IntoIterator<Item = DispatchType>) -> Self {
        self.dispatch_types = dispatch_types.into_iter().collect();
        self
    }

    pub fn applies_to(&self, path: &str, dispatch_type: DispatchType) -> bool {
        self.dispatch_types.contains(&dispatch_type) && self.scope.matches(path)
    }

    pub(crate) fn stage(&self) -> Stage {
        let filter = self.filter.clone();
        Arc::new(move |request: Request<Body>, chain: Next| -> BoxFuture<Response> {
            let filter = filter.clone();
            Box::pin(async move { filter.do_filter(request, chain).await })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Passthrough;

    #[async_trait]
    impl Filter for Passthrough {
        async fn do_filter(&self, request: Request<Body>, chain: Next) -> Response {
            chain.run(request).await
        }
    }

    #[test]
    fn test_defaults_to_request_dispatch() {
        let registration = FilterRegistration::new(Passthrough);
        assert!(registration.applies_to("/members", DispatchType::Request));
        assert!(!registration.applies_to("/error", DispatchType::Error));
    }

    #[test]
    fn test_error_dispatch_opt_in() {
        let registration = FilterRegistration::new(Passthrough)
            .url_patterns(["/**"])
            .dispatch_types([DispatchType::Request, DispatchType::Error]);
        assert!(registration.applies_to("/error", DispatchType::Error));
        assert!(registration.applies_to("/error-ex", DispatchType::Request));
    }

    #[test]
    fn test_url_patterns_restrict() {
        let registration = FilterRegistration::new(Passthrough).url_patterns(["/api/**"]);
        assert!(registration.applies_to("/api/members", DispatchType::Request));
        assert!(!registration.applies_to("/members", DispatchType::Request));
    }
}
