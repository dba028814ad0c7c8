use super::FilterRegistration;
use crate::dispatch::DispatchType;
use crate::interceptor::{Next, chain};
use axum::{body::Body, http::Request, response::Response};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer for filters, selected per request by path and dispatch type
#[derive(Clone)]
pub struct FilterLayer {
    registrations: Arc<Vec<FilterRegistration>>,
}

impl FilterLayer {
    pub fn new(mut registrations: Vec<FilterRegistration>) -> Self {
        registrations.sort_by_key(|registration| registration.order);
        Self {
            registrations: Arc::new(registrations),
        }
    }
}

impl<S> Layer<S> for FilterLayer {
    type Service = FilterMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FilterMiddleware {
            inner,
            registrations: self.registrations.clone(),
        }
    }
}

#[derive(Clone)]
pub struct FilterMiddleware<S> {
    inner: S,
    registrations: Arc<Vec<FilterRegistration>>,
}

impl<S> Service<Request<Body>> for FilterMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let dispatch_type = request
            .extensions()
            .get::<DispatchType>()
            .copied()
            .unwrap_or_default();
        let stages = self
            .registrations
            .iter()
            .filter(|registration| registration.applies_to(request.uri().path(), dispatch_type))
            .map(FilterRegistration::stage)
            .collect();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let base = Next::new(move |request| {
            Box::pin(async move {
                match inner.call(request).await {
                    Ok(response) => response,
                    Err(never) => match never {},
                }
            })
        });

        let next = chain(stages, base);
        Box::pin(async move { Ok(next.run(request).await) })
    }
}
