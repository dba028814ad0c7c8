use crate::dispatch::DispatchType;
use crate::interceptor::{Interceptor, Next};
use crate::signal::ErrorSignal;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use std::time::Instant;
use uuid::Uuid;

/// An interceptor that logs request timing, status and raised exceptions
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn intercept(&self, request: Request<Body>, next: Next) -> Response {
        let id = Uuid::new_v4();
        let method = request.method().clone();
        let uri = request.uri().clone();
        let dispatch_type = request
            .extensions()
            .get::<DispatchType>()
            .copied()
            .unwrap_or_default();
        let start = Instant::now();

        tracing::info!("REQUEST [{}][{}][{} {}]", id, dispatch_type, method, uri);

        let response = next.run(request).await;
        let elapsed = start.elapsed();

        if let Some(ErrorSignal::ExceptionRaised(exception)) = response.extensions().get::<ErrorSignal>() {
            tracing::error!(
                exception = %exception,
                "afterCompletion error [{}][{} {}]",
                id,
                method,
                uri
            );
        }
        tracing::info!(
            "RESPONSE [{}][{}][{} {}] {} {:?}",
            id,
            dispatch_type,
            method,
            uri,
            response.status(),
            elapsed
        );
        response
    }
}
