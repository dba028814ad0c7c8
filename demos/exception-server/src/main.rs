use axum::ServiceExt;
use faultline::prelude::*;
use tower_http::trace::TraceLayer;

mod controllers;

use controllers::{MemberController, ServletController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting exception server...");

    // 1. Load configuration from the environment
    let config = WebConfig::from_service(&ConfigService::from_env())?;

    // 2. Mount controllers
    let router = mount_api(
        Router::new().merge(ServletController::router()),
        &config.api_base_path,
        MemberController::router(),
    );

    // 3. Install the error handling stack
    let app = WebStack::with_defaults(config)
        .apply(router.layer(TraceLayer::new_for_http()));

    // 4. Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `Router::nest` rejects the root path, so a root API is merged instead
fn mount_api(router: Router, base_path: &str, api: Router) -> Router {
    match base_path.trim_end_matches('/') {
        "" => router.merge(api),
        base_path => router.nest(base_path, api),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn status(router: Router, uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_api_mounted_under_base_path() {
        let router = mount_api(Router::new(), "/api", MemberController::router());
        assert_eq!(status(router, "/api/members/7").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_mounted_at_root() {
        let router = mount_api(Router::new(), "/", MemberController::router());
        assert_eq!(status(router, "/members/7").await, StatusCode::OK);
    }
}
