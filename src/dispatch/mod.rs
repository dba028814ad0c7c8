//! Per-request error dispatch.
//!
//! A request moves through these states:
//!
//! ```text
//! RECEIVED -> HANDLING -> { THREW | EXPLICIT_STATUS | OK }
//! THREW           -> RESOLVER_CHAIN_EVAL -> { HANDLED | PROPAGATE -> ERROR_DISPATCH }
//! EXPLICIT_STATUS -> ERROR_DISPATCH
//! OK              -> RESPONSE_SENT
//! ```
//!
//! [`ErrorDispatcher`] is the policy as a plain function of the signal. The
//! tower side is split in two layers: [`DispatcherLayer`] applies it around
//! the handlers and leaves [`ErrorAttributes`] on responses bound for the
//! error page, and [`ErrorPageLayer`] wraps the whole router and performs the
//! second dispatch to the error path.

use crate::common::ErrorResult;
use crate::resolver::{RequestInfo, ResolutionOutcome, ResolverChain, ResponseState};
use crate::signal::ErrorSignal;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub mod attributes;
pub mod layer;
pub mod page;

pub use attributes::ErrorAttributes;
pub use layer::{DispatcherLayer, DispatcherMiddleware};
pub use page::{ErrorPageLayer, ErrorPageService, error_page_route};

/// Which pass of the request this is.
///
/// Inserted as a request extension; cross-cutting concerns branch on it
/// instead of guessing from the path.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum DispatchType {
    /// The original client request
    #[default]
    Request,
    /// The internal re-dispatch to the error path
    Error,
}

/// Final decision for a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Respond directly; `None` means status only
    Respond {
        status: StatusCode,
        body: Option<ErrorResult>,
    },
    /// Re-dispatch to the error page with these attributes
    ErrorPage(ErrorAttributes),
}

#[derive(Debug, Clone, Default)]
pub struct ErrorDispatcher {
    chain: ResolverChain,
}

impl ErrorDispatcher {
    pub fn new(chain: ResolverChain) -> Self {
        Self { chain }
    }

    /// Decide what happens to a request that produced `signal`.
    ///
    /// Explicit statuses never reach the resolver chain. A status committed
    /// through [`ResponseState::send_error`] wins over the outcome's own
    /// status when no body was produced, and is what the error page sees
    /// when the exception propagates.
    pub fn dispatch(
        &self,
        request: &RequestInfo,
        response: &mut ResponseState,
        signal: &ErrorSignal,
    ) -> Disposition {
        let exception = match signal {
            ErrorSignal::ExplicitStatus { status, .. } => {
                tracing::debug!(status = status.as_u16(), path = request.path(), "Explicit status sent");
                return Disposition::ErrorPage(ErrorAttributes::from_signal(signal, request.path()));
            }
            ErrorSignal::ExceptionRaised(exception) => exception,
        };

        match self.chain.resolve(request, response, exception) {
            ResolutionOutcome::Handled { status, body: None } => Disposition::Respond {
                status: response.status().unwrap_or(status),
                body: None,
            },
            ResolutionOutcome::Handled { status, body } => Disposition::Respond { status, body },
            ResolutionOutcome::Propagate | ResolutionOutcome::Unhandled => {
                Disposition::ErrorPage(error_page_attributes(signal, request.path(), response))
            }
        }
    }
}

fn error_page_attributes(signal: &ErrorSignal, path: &str, response: &ResponseState) -> ErrorAttributes {
    match response.status() {
        // The resolver took over the response: its status and message replace the exception's.
        Some(status) => {
            ErrorAttributes::new(status, path).with_message(response.error_message().map(str::to_owned))
        }
        None => ErrorAttributes::from_signal(signal, path),
    }
}
