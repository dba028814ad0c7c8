use std::error::Error;
use thiserror::Error;

/// A caller supplied a malformed or invalid argument.
///
/// The message is considered safe to echo back to the caller.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct IllegalArgument {
    message: String,
}

impl IllegalArgument {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An application-defined business rule was violated.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UserException {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl UserException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
