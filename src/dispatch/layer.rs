use super::{Disposition, ErrorDispatcher};
use crate::resolver::{RequestInfo, ResponseState};
use crate::signal::ErrorSignal;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that applies the [`ErrorDispatcher`] to handler responses.
///
/// Handled exceptions are replaced by their resolved response. Anything
/// else, including explicit statuses, passes through with its signal intact
/// and the [`ErrorAttributes`](super::ErrorAttributes) the
/// [`ErrorPageLayer`](super::ErrorPageLayer) should render.
#[derive(Clone)]
pub struct DispatcherLayer {
    dispatcher: Arc<ErrorDispatcher>,
}

impl DispatcherLayer {
    pub fn new(dispatcher: ErrorDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl<S> Layer<S> for DispatcherLayer {
    type Service = DispatcherMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DispatcherMiddleware {
            inner,
            dispatcher: self.dispatcher.clone(),
        }
    }
}

#[derive(Clone)]
pub struct DispatcherMiddleware<S> {
    inner: S,
    dispatcher: Arc<ErrorDispatcher>,
}

impl<S> Service<Request<Body>> for DispatcherMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let dispatcher = self.dispatcher.clone();
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let info = RequestInfo::from_request(&request);
            let mut response = inner.call(request).await?;

            let Some(signal) = response.extensions().get::<ErrorSignal>().cloned() else {
                return Ok(response);
            };

            let mut state = ResponseState::new();
            match dispatcher.dispatch(&info, &mut state, &signal) {
                Disposition::Respond { status, body } => Ok(match body {
                    Some(body) => body.with_status(status),
                    None => status.into_response(),
                }),
                Disposition::ErrorPage(attributes) => {
                    response.extensions_mut().insert(attributes);
                    Ok(response)
                }
            }
        })
    }
}
