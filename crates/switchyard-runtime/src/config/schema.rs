//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use switchyard_core::{ParseMode, User};
use switchyard_framework::HandlerSettings;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SwitchyardConfig {
    /// The bot's own identity.
    #[serde(default)]
    pub bot: BotIdentityConfig,

    /// Dispatch behavior.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Bot identity
// =============================================================================

/// Who the bot is. Used for self-join detection and `@botname` matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotIdentityConfig {
    #[serde(default = "default_bot_id")]
    pub id: i64,

    /// Username without the leading `@`.
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_first_name")]
    pub first_name: String,
}

impl Default for BotIdentityConfig {
    fn default() -> Self {
        Self {
            id: default_bot_id(),
            username: default_username(),
            first_name: default_first_name(),
        }
    }
}

impl BotIdentityConfig {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            first_name: self.first_name.clone(),
            username: Some(self.username.clone()),
            is_bot: true,
            ..Default::default()
        }
    }
}

fn default_bot_id() -> i64 {
    1
}

fn default_username() -> String {
    "switchyard_bot".to_string()
}

fn default_first_name() -> String {
    "Switchyard".to_string()
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatcher settings as read from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Await each handler chain before taking the next update.
    #[serde(default)]
    pub synchronous: bool,

    /// Log every incoming update at debug level.
    #[serde(default)]
    pub verbose: bool,

    /// Default parse mode for outgoing messages.
    #[serde(default)]
    pub parse_mode: Option<ParseMode>,

    /// Capacity of the update channel between transport and dispatcher.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            synchronous: false,
            verbose: false,
            parse_mode: None,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl DispatchConfig {
    /// Converts to framework settings. The error sink is left at its default.
    pub fn to_settings(&self) -> HandlerSettings {
        let settings = HandlerSettings::new()
            .synchronous(self.synchronous)
            .verbose(self.verbose);
        match self.parse_mode {
            Some(mode) => settings.parse_mode(mode),
            None => settings,
        }
    }
}

fn default_channel_capacity() -> usize {
    100
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// How often the log file rolls over.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Rolled files to keep; `0` keeps all of them.
    #[serde(default = "default_max_files")]
    pub max_files: u32,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file name and line number.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-module level overrides, e.g. `switchyard_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            rotation: LogRotation::default(),
            max_files: default_max_files(),
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: HashMap::new(),
        }
    }
}

fn default_max_files() -> u32 {
    5
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events get logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}
