//! Errors raised while loading or validating a [`SwitchyardConfig`].
//!
//! [`SwitchyardConfig`]: super::SwitchyardConfig

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The extension maps to no format enabled in this build.
    #[error("config format `.{0}` is unknown or its feature is disabled")]
    UnsupportedFormat(String),

    /// A source could not be parsed or did not fit the schema.
    #[error("could not read switchyard config: {0}")]
    ParseError(String),

    #[error("invalid switchyard config: {message}")]
    ValidationError { message: String },

    #[error("switchyard config is missing `{field}`")]
    MissingField { field: String },
}

impl ConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
