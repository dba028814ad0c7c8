//! Exception resolvers and the ordered chain that consults them.

use crate::common::ErrorResult;
use crate::dispatch::DispatchType;
use crate::error::{FaultlineError, Result};
use crate::signal::Exception;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri, header};

pub mod chain;
pub mod status;
pub mod user;

pub use chain::{ResolverChain, ResolverChainBuilder};
pub use status::IllegalArgumentResolver;
pub use user::UserExceptionResolver;

/// The result of asking a resolver (or the whole chain) about an exception
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Resolution is finished. An empty body means "status only, render nothing".
    Handled {
        status: StatusCode,
        body: Option<ErrorResult>,
    },
    /// This resolver cannot classify the exception; try the next one
    Unhandled,
    /// Stop resolving and let the error reach the error-page dispatch
    Propagate,
}

impl ResolutionOutcome {
    pub fn handled(status: StatusCode, body: ErrorResult) -> Self {
        Self::Handled {
            status,
            body: Some(body),
        }
    }

    pub fn status_only(status: StatusCode) -> Self {
        Self::Handled { status, body: None }
    }

    /// Whether the chain must stop at this outcome
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// A unit of policy that classifies an exception into an HTTP outcome.
///
/// Resolvers are built once at startup and shared by every request, so
/// `resolve` must not depend on hidden mutable state: the same exception on
/// the same request always yields the same outcome.
pub trait HandlerExceptionResolver: Send + Sync + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn resolve(
        &self,
        request: &RequestInfo,
        response: &mut ResponseState,
        exception: &Exception,
    ) -> ResolutionOutcome;
}

/// Request metadata visible to resolvers
#[derive(Debug, Clone)]
pub struct RequestInfo {
    method: Method,
    uri: Uri,
    accept: Option<String>,
    dispatch_type: DispatchType,
}

impl RequestInfo {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            accept: None,
            dispatch_type: DispatchType::Request,
        }
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            accept: accept_header(request.headers()),
            dispatch_type: request
                .extensions()
                .get::<DispatchType>()
                .copied()
                .unwrap_or_default(),
        }
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn dispatch_type(&self) -> DispatchType {
        self.dispatch_type
    }

    /// Whether the caller asked for a JSON representation
    pub fn accepts_json(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|accept| accept.contains("application/json"))
    }
}

fn accept_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Per-request response state a resolver may write to.
///
/// Sending an error commits the response; a second send fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseState {
    status: Option<StatusCode>,
    error_message: Option<String>,
    committed: bool,
}

impl ResponseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw error status. No view is rendered afterwards.
    pub fn send_error(&mut self, status: StatusCode, message: Option<String>) -> Result<()> {
        if self.committed {
            return Err(FaultlineError::ResponseCommitted { status });
        }
        self.status = Some(status);
        self.error_message = message;
        self.committed = true;
        Ok(())
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}
