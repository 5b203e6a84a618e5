//! Error types shared by the core layer.

use thiserror::Error;

/// Result type for raw API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by [`Bot::call_api`](crate::Bot::call_api).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The bot has no transport attached.
    #[error("bot is offline")]
    Offline,

    /// The remote API rejected the call.
    #[error("API error ({code}): {description}")]
    Remote {
        /// Error code reported by the API.
        code: i32,
        /// Human-readable description.
        description: String,
    },

    /// Failed to serialise parameters or decode the response.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The transport failed to deliver the call.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
