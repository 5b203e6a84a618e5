//! Error types for the dispatch engine.

use std::any::Any;

use thiserror::Error;
use tower::BoxError;

/// Errors raised by the dispatcher itself.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered under the key.
    #[error("no handler registered for '{0}'")]
    NoHandler(String),

    /// The handler chain returned a failure.
    #[error("{0}")]
    Handler(BoxError),

    /// The handler chain panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl DispatchError {
    /// Builds a [`Panicked`](Self::Panicked) error from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_owned()
        };
        Self::Panicked(message)
    }
}
