use super::{InterceptorRegistration, Next, chain};
use crate::dispatch::DispatchType;
use axum::{body::Body, http::Request, response::Response};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer for invoking a chain of interceptors.
///
/// Registrations are sorted by `order` once; for each request only those
/// whose scope matches the path take part, the lowest order outermost.
/// Requests tagged [`DispatchType::Error`] skip every interceptor.
#[derive(Clone)]
pub struct InterceptorLayer {
    registrations: Arc<Vec<InterceptorRegistration>>,
}

impl InterceptorLayer {
    pub fn new(mut registrations: Vec<InterceptorRegistration>) -> Self {
        registrations.sort_by_key(|registration| registration.order);
        Self {
            registrations: Arc::new(registrations),
        }
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = InterceptorMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptorMiddleware {
            inner,
            registrations: self.registrations.clone(),
        }
    }
}

#[derive(Clone)]
pub struct InterceptorMiddleware<S> {
    inner: S,
    registrations: Arc<Vec<InterceptorRegistration>>,
}

impl<S> Service<Request<Body>> for InterceptorMiddleware<S>
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
        // Interceptors belong to the original dispatch only.
        let stages = match request.extensions().get::<DispatchType>() {
            Some(DispatchType::Error) => Vec::new(),
            _ => self
                .registrations
                .iter()
                .filter(|registration| registration.applies_to(request.uri().path()))
                .map(InterceptorRegistration::stage)
                .collect(),
        };

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
