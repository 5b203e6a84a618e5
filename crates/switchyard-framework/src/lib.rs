//! # Switchyard Framework
//!
//! The dispatch engine: everything between a decoded [`Update`] and the
//! handler that answers it.
//!
//! - [`Router`] / [`Group`]: registering handlers and middleware (build phase)
//! - [`Dispatcher`]: classifying and running updates (serve phase)
//! - [`classify`]: the pure update-to-endpoint decision tree
//! - [`middleware`]: tower-based chain composition and built-in middleware
//!
//! ```rust,ignore
//! use switchyard_framework::{HandlerSettings, Router, middleware};
//!
//! let mut router = Router::new();
//! router.layer(middleware::recover());
//! router.handle("/start", on_start);
//!
//! let dispatcher = router.build(HandlerSettings::default());
//! dispatcher.process_update(bot, update).await;
//! ```
//!
//! [`Update`]: switchyard_core::Update

pub mod classifier;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod registry;
pub mod settings;
pub mod sink;

pub use classifier::{Plan, Step, StepMode, classify};
pub use command::{Command, parse_callback, parse_command};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use handler::{BoxedHandler, Handler, HandlerResult, HandlerService, boxed, ignore};
pub use middleware::{Middleware, Next, apply, concat, from_fn};
pub use registry::{Group, Router};
pub use settings::{DispatchMode, HandlerSettings};
pub use sink::{ErrorSink, default_sink};

pub use tower::BoxError;
