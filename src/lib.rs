//! # Faultline
//!
//! Error classification and response translation for axum services.
//!
//! When a handler fails, Faultline decides what the caller sees:
//!
//! - **Explicit status**: a handler returns [`ExplicitStatus`] to send a status
//!   without failing. The resolver chain is bypassed entirely.
//! - **Resolver chain**: a raised [`Exception`] is offered to each registered
//!   resolver in order. The first terminal outcome wins.
//! - **Exception advice**: on API paths, a mapping table turns any exception
//!   into a status and an [`ErrorResult`] body. It is registered as the first
//!   resolver, so it runs before the others there.
//! - **Error page dispatch**: anything left unresolved is re-dispatched to the
//!   error path, carrying the original status, exception and URI.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use faultline::prelude::*;
//! use axum::routing::get;
//!
//! async fn member(Path(id): Path<String>) -> Result<String, Exception> {
//!     match id.as_str() {
//!         "bad" => Err(IllegalArgument::new("bad id").into()),
//!         "user-ex" => Err(UserException::new("member is locked").into()),
//!         _ => Ok(id),
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new().route("/api/members/{id}", get(member));
//!     let app = WebStack::with_defaults(WebConfig::default()).apply(router);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(listener, axum::ServiceExt::into_make_service(app))
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod advice;
pub mod common;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod interceptor;
pub mod resolver;
pub mod scope;
pub mod signal;
pub mod web;

// Re-export core types
pub use common::ErrorResult;
pub use error::{FaultlineError, Result};
pub use signal::{ErrorSignal, Exception, ExceptionKind, ExplicitStatus};
pub use web::WebStack;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use faultline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::advice::{AdviceResolver, ExceptionAdvice, MessageSource};
    pub use crate::common::ErrorResult;
    pub use crate::config::{ConfigService, WebConfig};
    pub use crate::dispatch::{DispatchType, Disposition, ErrorAttributes, ErrorDispatcher};
    pub use crate::error::FaultlineError;
    pub use crate::filter::{Filter, FilterRegistration, LogFilter};
    pub use crate::interceptor::{Interceptor, InterceptorRegistration, LoggingInterceptor, Next};
    pub use crate::resolver::{
        HandlerExceptionResolver, IllegalArgumentResolver, RequestInfo, ResolutionOutcome,
        ResolverChain, ResponseState, UserExceptionResolver,
    };
    pub use crate::scope::PathScope;
    pub use crate::signal::{
        ErrorSignal, Exception, ExceptionKind, ExplicitStatus, IllegalArgument, UserException,
    };
    pub use crate::web::WebStack;
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
