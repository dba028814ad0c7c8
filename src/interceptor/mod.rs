use crate::scope::PathScope;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub mod layer;
pub mod logging;

pub use layer::{InterceptorLayer, InterceptorMiddleware};
pub use logging::LoggingInterceptor;

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Represents the next handler in the chain
pub struct Next {
    run: Box<dyn FnOnce(Request<Body>) -> BoxFuture<Response> + Send>,
}

impl Next {
    /// Create a new Next handler
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> BoxFuture<Response> + Send + 'static,
    {
        Self { run: Box::new(f) }
    }

    /// Execute the next handler
    pub async fn run(self, request: Request<Body>) -> Response {
        (self.run)(request).await
    }
}

/// A type-erased stage of a chain: interceptors and filters both reduce to this
pub(crate) type Stage = Arc<dyn Fn(Request<Body>, Next) -> BoxFuture<Response> + Send + Sync>;

/// Wrap `base` in `stages`, the first stage outermost
pub(crate) fn chain(stages: Vec<Stage>, base: Next) -> Next {
    stages.into_iter().rev().fold(base, |next, stage| {
        Next::new(move |request| stage(request, next))
    })
}

/// The Interceptor trait
///
/// Interceptors run inside the dispatcher, around the matched handler. They
/// see raised exceptions through the response's
/// [`ErrorSignal`](crate::signal::ErrorSignal) extension.
///
/// # Example
/// ```
/// use faultline::interceptor::{Interceptor, Next};
/// use faultline::async_trait;
/// use axum::{body::Body, http::Request, response::Response};
///
/// struct Timing;
///
/// #[async_trait]
/// impl Interceptor for Timing {
///     async fn intercept(&self, req: Request<Body>, next: Next) -> Response {
///         let start = std::time::Instant::now();
///         let res = next.run(req).await;
///         tracing::info!(elapsed = ?start.elapsed(), "done");
///         res
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, request: Request<Body>, next: Next) -> Response;
}

/// An interceptor with its order and path scope
#[derive(Clone)]
pub struct InterceptorRegistration {
    interceptor: Arc<dyn Interceptor>,
    order: i32,
    scope: PathScope,
}

impl InterceptorRegistration {
    /// Registers for every path with order 0
    pub fn new<I: Interceptor>(interceptor: I) -> Self {
        Self {
            interceptor: Arc::new(interceptor),
            order: 0,
            scope: PathScope::all(),
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Replace the include patterns
    pub fn add_path_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excludes = self.scope.excludes().to_vec();
        self.scope = PathScope::new().include_all(patterns).exclude_all(excludes);
        self
    }

    pub fn exclude_path_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = self.scope.exclude_all(patterns);
        self
    }

    pub fn scope(&self) -> &PathScope {
        &self.scope
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.scope.matches(path)
    }

    fn stage(&self) -> Stage {
        let interceptor = self.interceptor.clone();
        Arc::new(move |request: Request<Body>, next: Next| -> BoxFuture<Response> {
            let interceptor = interceptor.clone();
            Box::pin(async move { interceptor.intercept(request, next).await })
        })
    }
}
