//! Dispatcher settings.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use switchyard_core::{Context, ParseMode};
use tower::BoxError;

use crate::sink::ErrorSink;

/// How [`Dispatcher`](crate::Dispatcher) runs a matched handler chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Await the chain before returning.
    Sync,
    /// Spawn the chain on the tokio runtime and return immediately.
    #[default]
    Async,
}

/// Settings fixed when the router is built.
///
/// ```rust,ignore
/// let settings = HandlerSettings::default()
///     .synchronous(true)
///     .parse_mode(ParseMode::Html)
///     .on_error(|err, ctx| eprintln!("{err} in {:?}", ctx.map(|c| c.update().id)));
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct HandlerSettings {
    pub mode: DispatchMode,
    /// Log every incoming update before classification.
    pub verbose: bool,
    /// Default parse mode carried by every context.
    pub parse_mode: Option<ParseMode>,
    /// Replaces the default logging sink.
    #[serde(skip)]
    pub on_error: Option<ErrorSink>,
}

impl HandlerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synchronous(mut self, synchronous: bool) -> Self {
        self.mode = if synchronous {
            DispatchMode::Sync
        } else {
            DispatchMode::Async
        };
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    pub fn on_error<F>(mut self, sink: F) -> Self
    where
        F: Fn(&BoxError, Option<&Context>) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(sink));
        self
    }
}

impl fmt::Debug for HandlerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSettings")
            .field("mode", &self.mode)
            .field("verbose", &self.verbose)
            .field("parse_mode", &self.parse_mode)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = HandlerSettings::default();
        assert_eq!(settings.mode, DispatchMode::Async);
        assert!(!settings.verbose);
        assert!(settings.parse_mode.is_none());
        assert!(settings.on_error.is_none());
    }

    #[test]
    fn test_builder() {
        let settings = HandlerSettings::new()
            .synchronous(true)
            .verbose(true)
            .parse_mode(ParseMode::MarkdownV2)
            .on_error(|_, _| {});
        assert_eq!(settings.mode, DispatchMode::Sync);
        assert!(settings.verbose);
        assert_eq!(settings.parse_mode, Some(ParseMode::MarkdownV2));
        assert!(format!("{settings:?}").contains("on_error: true"));
    }

    #[test]
    fn test_deserialize() {
        let settings: HandlerSettings =
            serde_json::from_str(r#"{"mode": "sync", "parse_mode": "HTML"}"#).unwrap();
        assert_eq!(settings.mode, DispatchMode::Sync);
        assert_eq!(settings.parse_mode, Some(ParseMode::Html));
    }
}
