use super::Filter;
use crate::dispatch::DispatchType;
use crate::interceptor::Next;
use crate::signal::ErrorSignal;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use uuid::Uuid;

/// Logs a `REQUEST`/`RESPONSE` pair per dispatch.
///
/// Registered for `REQUEST` and `ERROR`, the error-page re-dispatch shows
/// up as its own pair tagged `ERROR`.
#[derive(Clone, Default)]
pub struct LogFilter;

#[async_trait]
impl Filter for LogFilter {
    async fn do_filter(&self, request: Request<Body>, chain: Next) -> Response {
        let id = Uuid::new_v4();
        let uri = request.uri().clone();
        let dispatch_type = request
            .extensions()
            .get::<DispatchType>()
            .copied()
            .unwrap_or_default();

        tracing::info!("REQUEST [{}][{}][{}]", id, dispatch_type, uri);
        let response = chain.run(request).await;

        if let Some(signal) = response.extensions().get::<ErrorSignal>() {
            match signal {
                ErrorSignal::ExceptionRaised(exception) => {
                    tracing::info!("EXCEPTION [{}] {}", id, exception);
                }
                ErrorSignal::ExplicitStatus { status, .. } => {
                    tracing::info!("SEND_ERROR [{}] {}", id, status);
                }
            }
        }
        tracing::info!("RESPONSE [{}][{}][{}]", id, dispatch_type, uri);
        response
    }
}
