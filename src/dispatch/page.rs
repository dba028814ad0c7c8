use super::{DispatchType, ErrorAttributes};
use crate::error::FaultlineError;
use crate::resolver::RequestInfo;
use crate::signal::ErrorSignal;
use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, any},
};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Container-level error handling.
///
/// Wraps the whole router. Every request is tagged [`DispatchType::Request`];
/// if the response still carries an unresolved [`ErrorSignal`], the request
/// is dispatched a second time to the error path, tagged
/// [`DispatchType::Error`] and carrying [`ErrorAttributes`]. Attributes left
/// on the response by the [`DispatcherLayer`](super::DispatcherLayer) are
/// used as they are; otherwise they are derived from the signal.
#[derive(Clone)]
pub struct ErrorPageLayer {
    error_path: Arc<str>,
}

impl ErrorPageLayer {
    pub fn new(error_path: impl Into<String>) -> Self {
        Self {
            error_path: Arc::from(error_path.into()),
        }
    }
}

impl<S> Layer<S> for ErrorPageLayer {
    type Service = ErrorPageService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorPageService {
            inner,
            error_path: self.error_path.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ErrorPageService<S> {
    inner: S,
    error_path: Arc<str>,
}

impl<S> Service<Request<Body>> for ErrorPageService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Display + Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let error_path = self.error_path.clone();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            if request.extensions().get::<DispatchType>().is_none() {
                request.extensions_mut().insert(DispatchType::Request);
            }
            let info = RequestInfo::from_request(&request);
            let accept = request.headers().get(header::ACCEPT).cloned();

            let response = inner.call(request).await?;
            let Some(signal) = response.extensions().get::<ErrorSignal>().cloned() else {
                return Ok(response);
            };

            let mut attributes = response
                .extensions()
                .get::<ErrorAttributes>()
                .cloned()
                .unwrap_or_else(|| ErrorAttributes::from_signal(&signal, info.path()));
            // Inner layers may see a rewritten URI under nested routers.
            attributes.path = info.path().to_owned();
            let status = attributes.status_code();
            tracing::debug!(
                status = status.as_u16(),
                path = info.path(),
                error_path = &*error_path,
                "Dispatching to error page"
            );

            let mut builder = Request::builder()
                .method(info.method().clone())
                .uri(&*error_path)
                .extension(DispatchType::Error)
                .extension(attributes);
            if let Some(accept) = accept {
                builder = builder.header(header::ACCEPT, accept);
            }
            let error_request = match builder.body(Body::empty()) {
                Ok(error_request) => error_request,
                Err(err) => return Ok(FaultlineError::ErrorPage(err.to_string()).into_response()),
            };

            let page = match inner.ready().await {
                Ok(ready) => ready.call(error_request).await,
                Err(err) => Err(err),
            };
            match page {
                Ok(mut page) => {
                    // No second round: whatever the error page did, the original status stands.
                    page.extensions_mut().remove::<ErrorSignal>();
                    *page.status_mut() = status;
                    Ok(page)
                }
                Err(err) => Ok(FaultlineError::ErrorPage(err.to_string()).into_response()),
            }
        })
    }
}

/// The default error page: renders the dispatched [`ErrorAttributes`] as JSON.
///
/// Exception detail is only included when `include_details` is set.
pub fn error_page_route(include_details: bool) -> MethodRouter {
    any(move |request: Request<Body>| async move { render_error_page(&request, include_details) })
}

fn render_error_page(request: &Request<Body>, include_details: bool) -> Response {
    let attributes = request
        .extensions()
        .get::<ErrorAttributes>()
        .cloned()
        .unwrap_or_else(|| {
            ErrorAttributes::new(StatusCode::INTERNAL_SERVER_ERROR, request.uri().path())
        });
    let attributes = if include_details {
        attributes
    } else {
        attributes.redacted()
    };
    (attributes.status_code(), Json(attributes)).into_response()
}
