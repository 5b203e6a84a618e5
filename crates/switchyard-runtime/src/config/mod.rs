//! Configuration for Switchyard bots.
//!
//! Layered loading with figment (defaults, files, environment), a typed
//! schema, and validation run on every load.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotIdentityConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, SpanEventConfig, SwitchyardConfig,
};
pub use validation::validate_config;
