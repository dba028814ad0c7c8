use faultline::prelude::*;
use axum::routing::get;

/// Routes that fail outside the API base path
pub struct ServletController;

impl ServletController {
    pub fn router() -> Router {
        Router::new()
            .route("/error-ex", get(Self::error_ex))
            .route("/illegal", get(Self::illegal))
            .route("/error-400", get(Self::error_400))
            .route("/error-404", get(Self::error_404))
            .route("/error-500", get(Self::error_500))
    }

    async fn error_ex() -> Result<(), Exception> {
        Err(Exception::runtime("exception raised"))
    }

    async fn illegal() -> Result<(), Exception> {
        Err(IllegalArgument::new("bad argument").into())
    }

    async fn error_400() -> ExplicitStatus {
        ExplicitStatus::new(StatusCode::BAD_REQUEST, "400 error")
    }

    async fn error_404() -> ExplicitStatus {
        ExplicitStatus::new(StatusCode::NOT_FOUND, "404 error")
    }

    async fn error_500() -> ExplicitStatus {
        ExplicitStatus::status_only(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
