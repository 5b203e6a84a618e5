//! # Switchyard
//!
//! Update dispatch for Telegram-style bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐     ┌────────────┐     ┌────────────┐     ┌───────────────────────────┐
//! │ Transport │────▶│ UpdateLoop │────▶│ Dispatcher │────▶│ "/start"  (own chain)     │
//! │ (channel) │     │            │     │  classify  │────▶│ On::Text  (own chain)     │
//! └───────────┘     └────────────┘     └────────────┘────▶│ button    (own chain)     │
//!                                                         └───────────────────────────┘
//! ```
//!
//! - **Classifier**: maps each update to an ordered plan of endpoint keys
//! - **Router**: registers handlers under endpoints, wrapped in middleware
//! - **Dispatcher**: walks the plan and runs the registered chains, sync or spawned
//! - **Runtime**: configuration, logging and the update loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! async fn start(ctx: Arc<Context>) -> HandlerResult {
//!     info!(payload = ctx.data(), "start");
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     init_from_config(&config.logging)?;
//!
//!     let mut router = Router::new();
//!     router.layer(recover()).handle("/start", start);
//!
//!     let (tx, rx) = update_channel(config.dispatch.channel_capacity);
//!     let bot = OfflineBot::from_config(&config.bot).boxed();
//!     UpdateLoop::new(router.build(config.dispatch.to_settings()), bot)
//!         .run_until_ctrl_c(rx)
//!         .await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use switchyard_core as core;
pub use switchyard_framework as framework;
pub use switchyard_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime
    pub use switchyard_runtime::config::{load_config, load_config_from_file};
    pub use switchyard_runtime::logging::init_from_config;
    pub use switchyard_runtime::{OfflineBot, SwitchyardConfig, UpdateLoop, update_channel};

    // Registration and dispatch
    pub use switchyard_framework::middleware::{
        blacklist, from_fn, ignore_via_bots, logger, recover, whitelist,
    };
    pub use switchyard_framework::{
        BoxError, Dispatcher, HandlerResult, HandlerSettings, Middleware, Router,
    };

    // Model and context
    pub use switchyard_core::{
        Bot, BoxedBot, Btn, Context, InlineButton, On, ParseMode, Update, User,
    };

    // Logging
    pub use switchyard_runtime::prelude::*;
}
