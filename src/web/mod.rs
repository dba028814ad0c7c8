//! Assembly of the full error-handling stack around an axum [`Router`].
//!
//! Layer order, outermost first:
//!
//! 1. [`ErrorPageLayer`]: tags dispatches and performs the error re-dispatch
//! 2. [`FilterLayer`]: filters selected by dispatch type
//! 3. [`DispatcherLayer`]: the resolver chain
//! 4. [`InterceptorLayer`]: interceptors selected by path
//! 5. the handlers

use crate::advice::AdviceResolver;
use crate::config::WebConfig;
use crate::dispatch::{DispatcherLayer, ErrorDispatcher, ErrorPageLayer, ErrorPageService, error_page_route};
use crate::filter::{FilterLayer, FilterRegistration, LogFilter};
use crate::interceptor::{InterceptorLayer, InterceptorRegistration, LoggingInterceptor};
use crate::resolver::{
    HandlerExceptionResolver, IllegalArgumentResolver, ResolverChainBuilder, UserExceptionResolver,
};
use axum::Router;
use tower::Layer;

/// Builder for the error-handling stack.
///
/// Everything registered here is frozen by [`WebStack::apply`]; requests
/// only ever read it.
///
/// # Example
/// ```
/// use axum::{Router, routing::get};
/// use faultline::config::WebConfig;
/// use faultline::signal::Exception;
/// use faultline::web::WebStack;
///
/// let router = Router::new().route(
///     "/api/members/{id}",
///     get(|| async { Err::<String, _>(Exception::illegal_argument("bad id")) }),
/// );
/// let app = WebStack::with_defaults(WebConfig::default()).apply(router);
/// ```
pub struct WebStack {
    config: WebConfig,
    resolvers: ResolverChainBuilder,
    interceptors: Vec<InterceptorRegistration>,
    filters: Vec<FilterRegistration>,
    default_error_page: bool,
}

impl WebStack {
    /// An empty stack: no resolvers, interceptors or filters
    pub fn new(config: WebConfig) -> Self {
        Self {
            config,
            resolvers: ResolverChainBuilder::new(),
            interceptors: Vec::new(),
            filters: Vec::new(),
            default_error_page: true,
        }
    }

    /// Advice on the API base path, then the illegal-argument and user
    /// resolvers, plus request logging as an interceptor and a filter.
    ///
    /// The error path is always excluded from the logging interceptor.
    pub fn with_defaults(config: WebConfig) -> Self {
        let advice = AdviceResolver::for_base_path(&config.api_base_path);
        let logging = InterceptorRegistration::new(LoggingInterceptor)
            .order(1)
            .add_path_patterns(config.interceptor_include.clone())
            .exclude_path_patterns(config.interceptor_exclude.clone())
            .exclude_path_patterns([config.error_path.clone()]);
        let log_filter = FilterRegistration::new(LogFilter)
            .order(1)
            .url_patterns(["/**"])
            .dispatch_types(config.filter_dispatch_types.clone());

        Self::new(config)
            .resolver(advice)
            .resolver(IllegalArgumentResolver)
            .resolver(UserExceptionResolver)
            .interceptor(logging)
            .filter(log_filter)
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Append a resolver; earlier registrations take priority
    pub fn resolver<R: HandlerExceptionResolver>(mut self, resolver: R) -> Self {
        self.resolvers = self.resolvers.register(resolver);
        self
    }

    pub fn interceptor(mut self, registration: InterceptorRegistration) -> Self {
        self.interceptors.push(registration);
        self
    }

    pub fn filter(mut self, registration: FilterRegistration) -> Self {
        self.filters.push(registration);
        self
    }

    /// Skip mounting the built-in JSON error page on the error path
    pub fn without_default_error_page(mut self) -> Self {
        self.default_error_page = false;
        self
    }

    pub fn apply(self, router: Router) -> ErrorPageService<Router> {
        let chain = self.resolvers.build();
        tracing::info!(
            resolvers = ?chain.names(),
            interceptors = self.interceptors.len(),
            filters = self.filters.len(),
            error_path = %self.config.error_path,
            "Installing error handling"
        );

        let router = if self.default_error_page {
            router.route(
                &self.config.error_path,
                error_page_route(self.config.include_details),
            )
        } else {
            router
        };

        let router = router
            .layer(InterceptorLayer::new(self.interceptors))
            .layer(DispatcherLayer::new(ErrorDispatcher::new(chain)))
            .layer(FilterLayer::new(self.filters));

        ErrorPageLayer::new(self.config.error_path).layer(router)
    }
}
