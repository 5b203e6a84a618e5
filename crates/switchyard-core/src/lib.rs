//! # Switchyard Core
//!
//! Foundation types for the Switchyard update-dispatch engine.
//!
//! - **Model**: the inbound [`Update`] union and the records it carries
//!   ([`Message`], [`Callback`], ...), deserialised from the platform's JSON.
//! - **Endpoints**: the shared key namespace of commands, event tags ([`On`])
//!   and callback-button uniques ([`CallbackEndpoint`]).
//! - **Identity**: the [`Bot`] trait the dispatcher consults for its own
//!   user and handlers use to call the API.
//! - **Context**: [`BaseContext`] per update and [`Context`] per dispatch.
//!
//! The dispatch engine itself lives in `switchyard-framework`.

pub mod bot;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod model;

pub use bot::{Bot, BoxedBot, downcast_bot};
pub use context::{BaseContext, Context, ParseMode, Route};
pub use endpoint::{CALLBACK_PREFIX, CallbackEndpoint, EVENT_PREFIX, Endpoint, On, display_key};
pub use error::{ApiError, ApiResult};
pub use model::{
    Btn, Callback, Chat, ChatType, InlineButton, Message, ReplyButton, Update, UpdateKind,
    UpdateMeta, User,
};
