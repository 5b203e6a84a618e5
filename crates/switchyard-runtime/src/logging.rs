//! Logging setup on `tracing-subscriber`.
//!
//! Dispatch logs carry structured fields (`update_id`, `endpoint`, `error`),
//! so a JSON or compact formatter with an `EnvFilter` is usually all a bot
//! needs.
//!
//! ```rust,ignore
//! use switchyard_runtime::{config::load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging)?;
//! ```
//!
//! ```rust,ignore
//! use switchyard_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .directive("switchyard_framework=debug")
//!     .span_events(SpanEvents::Lifecycle)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};
use crate::error::{RuntimeError, RuntimeResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Preset span event selections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpanEvents {
    #[default]
    None,
    /// Span creation and close.
    Lifecycle,
    /// Enter and exit.
    Active,
    Full,
}

impl SpanEvents {
    fn mask(self) -> FmtSpan {
        match self {
            Self::None => FmtSpan::NONE,
            Self::Lifecycle => FmtSpan::NEW | FmtSpan::CLOSE,
            Self::Active => FmtSpan::ACTIVE,
            Self::Full => FmtSpan::FULL,
        }
    }
}

fn config_mask(config: &SpanEventConfig) -> FmtSpan {
    [
        (config.new, FmtSpan::NEW),
        (config.enter, FmtSpan::ENTER),
        (config.exit, FmtSpan::EXIT),
        (config.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |mask, (_, event)| mask | event)
}

/// Installs the global subscriber described by `config`.
pub fn init_from_config(config: &LoggingConfig) -> RuntimeResult<()> {
    LoggingBuilder::from_config(config).try_init()
}

/// Builder for the global tracing subscriber.
#[derive(Debug)]
pub struct LoggingBuilder {
    level: tracing::Level,
    directives: Vec<String>,
    format: LogFormat,
    output: LogOutput,
    file_path: Option<PathBuf>,
    rotation: LogRotation,
    max_files: usize,
    span_events: FmtSpan,
    target: bool,
    thread_ids: bool,
    location: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Compact output to stdout at `info`.
    pub fn new() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: Vec::new(),
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            rotation: LogRotation::Never,
            max_files: 5,
            span_events: FmtSpan::NONE,
            target: true,
            thread_ids: false,
            location: false,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        let directives = config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={level}"))
            .collect();

        Self {
            level: config.level.to_tracing_level(),
            directives,
            format: config.format,
            output: config.output,
            file_path: config.file_path.clone(),
            rotation: config.rotation,
            max_files: config.max_files as usize,
            span_events: config_mask(&config.span_events),
            thread_ids: config.thread_ids,
            location: config.file_location,
            ..Self::new()
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a filter directive such as `switchyard_framework=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events.mask();
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Include file names and line numbers.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.location = enabled;
        self
    }

    /// Writes to `path` instead of a standard stream.
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self.output = LogOutput::File;
        self
    }

    pub fn rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rolled files to keep; `0` keeps all of them.
    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    /// `RUST_LOG` when set, otherwise the configured level, plus directives.
    /// Directives that fail to parse are skipped.
    fn build_filter(&self) -> EnvFilter {
        let fallback = self.level.as_str().to_lowercase();
        self.directives
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
                EnvFilter::add_directive,
            )
    }

    fn writer(&self) -> RuntimeResult<BoxMakeWriter> {
        let writer = match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => {
                let path = self.file_path.as_deref().ok_or_else(|| {
                    RuntimeError::Logging("file output requested but no file path configured".into())
                })?;
                BoxMakeWriter::new(self.file_appender(path)?)
            }
        };
        Ok(writer)
    }

    fn file_appender(&self, path: &Path) -> RuntimeResult<RollingFileAppender> {
        let rotation = match self.rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        };
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .unwrap_or_else(|| OsStr::new("switchyard.log"))
            .to_string_lossy();

        let mut builder = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(file_name.as_ref());
        if self.max_files > 0 {
            builder = builder.max_log_files(self.max_files);
        }
        builder
            .build(directory)
            .map_err(|e| RuntimeError::Logging(e.to_string()))
    }

    fn fmt_layer(&self, writer: BoxMakeWriter) -> BoxedLayer {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(self.span_events.clone())
            .with_target(self.target)
            .with_thread_ids(self.thread_ids)
            .with_file(self.location)
            .with_line_number(self.location);

        match self.format {
            LogFormat::Full => layer.boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => layer.compact().boxed(),
        }
    }

    /// Installs the subscriber, ignoring failure if one is already set.
    pub fn init(self) {
        let _ = self.try_init();
    }

    pub fn try_init(self) -> RuntimeResult<()> {
        let layer = self.fmt_layer(self.writer()?);
        tracing_subscriber::registry()
            .with(layer)
            .with(self.build_filter())
            .try_init()
            .map_err(|e| RuntimeError::Logging(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_from_config() {
        let mut config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            thread_ids: true,
            file_location: true,
            rotation: LogRotation::Daily,
            max_files: 3,
            ..Default::default()
        };
        config.span_events.close = true;
        config
            .filters
            .insert("switchyard_framework".into(), LogLevel::Trace);

        let builder = LoggingBuilder::from_config(&config);
        assert_eq!(builder.level, tracing::Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Pretty);
        assert!(builder.thread_ids && builder.location && builder.target);
        assert_eq!(builder.span_events, FmtSpan::CLOSE);
        assert_eq!(builder.rotation, LogRotation::Daily);
        assert_eq!(builder.max_files, 3);
        assert_eq!(builder.directives, ["switchyard_framework=trace"]);
    }

    #[test]
    fn test_file_path_switches_output() {
        let builder = LoggingBuilder::new().file_path("logs/yard.log");
        assert_eq!(builder.output, LogOutput::File);
        assert_eq!(builder.file_path.as_deref(), Some(Path::new("logs/yard.log")));
    }

    #[test]
    fn test_file_output_without_path_fails() {
        let err = LoggingBuilder::new()
            .output(LogOutput::File)
            .try_init()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Logging(_)));
    }

    #[test]
    fn test_span_event_presets() {
        assert_eq!(SpanEvents::default().mask(), FmtSpan::NONE);
        assert_eq!(SpanEvents::Lifecycle.mask(), FmtSpan::NEW | FmtSpan::CLOSE);

        let config = SpanEventConfig {
            enter: true,
            exit: true,
            ..Default::default()
        };
        assert_eq!(config_mask(&config), SpanEvents::Active.mask());
    }
}
