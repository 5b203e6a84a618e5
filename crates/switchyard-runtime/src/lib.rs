//! Switchyard Runtime - what a bot process needs around the dispatcher.
//!
//! This crate provides:
//! - Layered configuration (`SwitchyardConfig`, `ConfigLoader`)
//! - Logging setup on `tracing-subscriber` (`LoggingBuilder`)
//! - The update loop that drains a channel into a `Dispatcher` (`UpdateLoop`)
//! - An API-less bot identity for offline feeds and tests (`OfflineBot`)
//!
//! ```rust,ignore
//! use switchyard_runtime::{OfflineBot, UpdateLoop, config::load_config, logging, update_channel};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging)?;
//!
//!     let dispatcher = router.build(config.dispatch.to_settings());
//!     let (tx, rx) = update_channel(config.dispatch.channel_capacity);
//!     tokio::spawn(poll_updates(tx));
//!
//!     let bot = OfflineBot::from_config(&config.bot).boxed();
//!     UpdateLoop::new(dispatcher, bot).run_until_ctrl_c(rx).await;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use bot::OfflineBot;
pub use config::{
    BotIdentityConfig, ConfigError, ConfigLoader, ConfigResult, DispatchConfig, LoggingConfig,
    Profile, SwitchyardConfig,
};
pub use error::{RuntimeError, RuntimeResult, TransportError};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{LoopStats, UpdateLoop, UpdateReceiver, UpdateSender, update_channel};

// Re-export tracing for use by bot crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
