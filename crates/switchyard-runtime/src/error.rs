//! Runtime error types.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Loading or validating configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The logging subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// The update channel was closed by the receiving side.
    #[error("Update channel closed")]
    ChannelClosed,
}

/// The error a transport attached to an update, as handed to the error sink.
///
/// Shares the original error with the update. [`source`](StdError::source)
/// yields it unwrapped, so sinks can downcast to the transport's own type.
#[derive(Debug, Clone)]
pub struct TransportError(Arc<dyn StdError + Send + Sync>);

impl TransportError {
    pub fn new(inner: Arc<dyn StdError + Send + Sync>) -> Self {
        Self(inner)
    }

    pub fn inner(&self) -> &Arc<dyn StdError + Send + Sync> {
        &self.0
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
