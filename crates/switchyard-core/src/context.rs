//! Dispatch context handed to handlers and middleware.
//!
//! Context is split in two, the same way a shared base and a per-consumer
//! view are split elsewhere in the framework:
//!
//! - [`BaseContext`] is created once per update. It owns the bot handle, the
//!   update exactly as received, and a typed state map shared by every
//!   handler that runs for that update.
//! - [`Context`] is created per dispatch step. It adds the [`Route`]: what
//!   the classifier derived for the endpoint being run (command payload,
//!   rewritten callback data, migration source, the joined user).
//!
//! The update itself is never mutated; derived values only live in the route.
//!
//! # Example
//!
//! ```rust,ignore
//! router.handle("/echo", |ctx: Arc<Context>| async move {
//!     let words = ctx.args();
//!     ctx.set_state(words.len());
//!     tracing::info!(endpoint = ctx.endpoint(), ?words, "echo");
//!     Ok::<_, BoxError>(())
//! });
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::bot::BoxedBot;
use crate::model::{
    Callback, Chat, ChatJoinRequest, ChatMemberUpdate, InlineResult, Message, Poll, PollAnswer,
    PreCheckoutQuery, Query, ShippingQuery, Update, UpdateKind, User,
};

/// Text formatting mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML", alias = "html")]
    Html,
    #[serde(alias = "markdown")]
    Markdown,
    #[serde(rename = "MarkdownV2", alias = "markdownv2")]
    MarkdownV2,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
            ParseMode::Markdown => "Markdown",
            ParseMode::MarkdownV2 => "MarkdownV2",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// BaseContext
// =============================================================================

/// Per-update state shared by every dispatch step of that update.
pub struct BaseContext {
    bot: BoxedBot,
    update: Update,
    state: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl BaseContext {
    pub fn new(bot: BoxedBot, update: Update) -> Self {
        Self {
            bot,
            update,
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// The update exactly as it was received.
    pub fn update(&self) -> &Update {
        &self.update
    }

    /// Stores a value in the per-update state map, replacing any value of
    /// the same type.
    pub fn set_state<T: Send + Sync + 'static>(&self, value: T) {
        self.state.lock().insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a cloned value from the per-update state map.
    pub fn get_state<T: Clone + 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    pub fn has_state<T: 'static>(&self) -> bool {
        self.state.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns a value from the per-update state map.
    pub fn take_state<T: 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }
}

impl fmt::Debug for BaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseContext")
            .field("update_id", &self.update.id)
            .field("kind", &self.update.kind.name())
            .field("me", &self.bot.me().id)
            .finish()
    }
}

// =============================================================================
// Route
// =============================================================================

/// What the classifier derived for one dispatch step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    /// The registry key being dispatched.
    pub key: String,
    /// Text after a parsed command, up to the end of the line.
    pub payload: Option<String>,
    /// Callback unique without its prefix, set on direct button dispatch.
    pub callback_unique: Option<String>,
    /// Callback payload split off the wire data on direct button dispatch.
    pub callback_data: Option<String>,
    /// Source chat of a group-to-supergroup migration.
    pub migrate_from: Option<i64>,
    /// The user this step reports, for per-user join dispatch.
    pub joined_user: Option<User>,
}

impl Route {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Context
// =============================================================================

/// The context a handler receives.
pub struct Context {
    base: Arc<BaseContext>,
    route: Route,
    parse_mode: Option<ParseMode>,
}

impl Context {
    pub fn new(base: Arc<BaseContext>, route: Route) -> Self {
        Self {
            base,
            route,
            parse_mode: None,
        }
    }

    /// Sets the default parse mode for outgoing actions.
    pub fn with_parse_mode(mut self, mode: Option<ParseMode>) -> Self {
        self.parse_mode = mode;
        self
    }

    pub fn base(&self) -> &Arc<BaseContext> {
        &self.base
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn bot(&self) -> &BoxedBot {
        self.base.bot()
    }

    pub fn me(&self) -> &User {
        self.base.bot().me()
    }

    pub fn update(&self) -> &Update {
        self.base.update()
    }

    /// The registry key this context was dispatched to.
    pub fn endpoint(&self) -> &str {
        &self.route.key
    }

    pub fn parse_mode(&self) -> Option<ParseMode> {
        self.parse_mode
    }

    /// The message this update is about, whichever kind carries it.
    ///
    /// For callbacks this is the message the pressed button was attached to.
    pub fn message(&self) -> Option<&Message> {
        match &self.update().kind {
            UpdateKind::Message(m)
            | UpdateKind::EditedMessage(m)
            | UpdateKind::ChannelPost(m)
            | UpdateKind::EditedChannelPost(m)
            | UpdateKind::BusinessMessage(m)
            | UpdateKind::EditedBusinessMessage(m) => Some(m.as_ref()),
            UpdateKind::Callback(c) => c.message.as_deref(),
            _ => None,
        }
    }

    pub fn callback(&self) -> Option<&Callback> {
        self.update().callback()
    }

    pub fn query(&self) -> Option<&Query> {
        self.update().query()
    }

    pub fn inline_result(&self) -> Option<&InlineResult> {
        self.update().inline_result()
    }

    pub fn shipping_query(&self) -> Option<&ShippingQuery> {
        self.update().shipping_query()
    }

    pub fn pre_checkout_query(&self) -> Option<&PreCheckoutQuery> {
        self.update().pre_checkout_query()
    }

    pub fn poll(&self) -> Option<&Poll> {
        self.update().poll()
    }

    pub fn poll_answer(&self) -> Option<&PollAnswer> {
        self.update().poll_answer()
    }

    pub fn chat_member(&self) -> Option<&ChatMemberUpdate> {
        self.update().chat_member()
    }

    pub fn chat_join_request(&self) -> Option<&ChatJoinRequest> {
        self.update().chat_join_request()
    }

    /// The user who caused this update.
    pub fn sender(&self) -> Option<&User> {
        match &self.update().kind {
            UpdateKind::Callback(c) => Some(&c.from),
            UpdateKind::Query(q) => Some(&q.from),
            UpdateKind::InlineResult(r) => Some(&r.from),
            UpdateKind::ShippingQuery(q) => Some(&q.from),
            UpdateKind::PreCheckoutQuery(q) => Some(&q.from),
            UpdateKind::PollAnswer(a) => a.user.as_ref(),
            UpdateKind::MyChatMember(m) | UpdateKind::ChatMember(m) => Some(&m.from),
            UpdateKind::ChatJoinRequest(r) => Some(&r.sender),
            UpdateKind::MessageReaction(r) => r.user.as_ref(),
            UpdateKind::BusinessConnection(c) => Some(&c.user),
            _ => self.message().and_then(|m| m.from.as_ref()),
        }
    }

    /// The chat this update happened in.
    pub fn chat(&self) -> Option<&Chat> {
        match &self.update().kind {
            UpdateKind::MyChatMember(m) | UpdateKind::ChatMember(m) => Some(&m.chat),
            UpdateKind::ChatJoinRequest(r) => Some(&r.chat),
            UpdateKind::MessageReaction(r) => Some(&r.chat),
            UpdateKind::MessageReactionCount(r) => Some(&r.chat),
            UpdateKind::Boost(b) => Some(&b.chat),
            UpdateKind::BoostRemoved(b) => Some(&b.chat),
            UpdateKind::DeletedBusinessMessages(d) => Some(&d.chat),
            _ => self.message().map(|m| &m.chat),
        }
    }

    /// Where replies should go: the chat if there is one, otherwise the
    /// sender's private chat.
    pub fn recipient(&self) -> Option<i64> {
        self.chat()
            .map(|c| c.id)
            .or_else(|| self.sender().map(|u| u.id))
    }

    /// Message text, or an empty string.
    pub fn text(&self) -> &str {
        self.message().map_or("", |m| m.text.as_str())
    }

    /// The payload of the update: command payload for messages, callback
    /// data (with the unique split off on direct button dispatch), query
    /// text, or invoice payload.
    pub fn data(&self) -> &str {
        match &self.update().kind {
            UpdateKind::Message(_) => self.route.payload.as_deref().unwrap_or_default(),
            UpdateKind::Callback(c) => self.route.callback_data.as_deref().unwrap_or(&c.data),
            UpdateKind::Query(q) => &q.text,
            UpdateKind::InlineResult(r) => &r.query,
            UpdateKind::ShippingQuery(q) => &q.payload,
            UpdateKind::PreCheckoutQuery(q) => &q.payload,
            _ => "",
        }
    }

    /// [`data`](Self::data) split into arguments: by whitespace for
    /// messages, by `|` for callbacks, by single spaces for queries.
    pub fn args(&self) -> Vec<&str> {
        match &self.update().kind {
            UpdateKind::Message(_) => self.data().split_whitespace().collect(),
            UpdateKind::Callback(_) => self.data().split('|').collect(),
            UpdateKind::Query(_) | UpdateKind::InlineResult(_) => self.data().split(' ').collect(),
            _ => Vec::new(),
        }
    }

    /// Text after the command, if a command was parsed.
    pub fn payload(&self) -> Option<&str> {
        self.route.payload.as_deref()
    }

    pub fn callback_unique(&self) -> Option<&str> {
        self.route.callback_unique.as_deref()
    }

    /// `(from, to)` chat ids of a group-to-supergroup migration.
    pub fn migration(&self) -> Option<(i64, i64)> {
        let m = self.message()?;
        let from = self.route.migrate_from.unwrap_or(m.migrate_from);
        if from == 0 && m.migrate_to == 0 {
            return None;
        }
        Some((from, m.migrate_to))
    }

    /// The user who joined. For multi-user joins this is the one user the
    /// current dispatch reports.
    pub fn joined_user(&self) -> Option<&User> {
        self.route
            .joined_user
            .as_ref()
            .or_else(|| self.message().and_then(|m| m.user_joined.as_ref()))
    }

    pub fn set_state<T: Send + Sync + 'static>(&self, value: T) {
        self.base.set_state(value);
    }

    pub fn get_state<T: Clone + 'static>(&self) -> Option<T> {
        self.base.get_state()
    }

    pub fn has_state<T: 'static>(&self) -> bool {
        self.base.has_state::<T>()
    }

    pub fn take_state<T: 'static>(&self) -> Option<T> {
        self.base.take_state()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("update_id", &self.update().id)
            .field("route", &self.route)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::Bot;
    use crate::error::{ApiError, ApiResult};
    use async_trait::async_trait;
    use serde_json::Value;

    struct TestBot(User);

    #[async_trait]
    impl Bot for TestBot {
        fn me(&self) -> &User {
            &self.0
        }

        async fn call_api(&self, _method: &str, _params: Value) -> ApiResult<Value> {
            Err(ApiError::Offline)
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn base(json: &str) -> Arc<BaseContext> {
        let update: Update = serde_json::from_str(json).unwrap();
        let bot = Arc::new(TestBot(User {
            id: 42,
            username: Some("yard_bot".into()),
            ..Default::default()
        }));
        Arc::new(BaseContext::new(bot, update))
    }

    #[test]
    fn test_message_payload_and_args() {
        let base = base(
            r#"{"update_id": 1, "message": {"message_id": 1, "from": {"id": 7},
                "chat": {"id": 7}, "text": "/ban  alice bob"}}"#,
        );
        let route = Route {
            payload: Some(" alice bob".into()),
            ..Route::new("/ban")
        };
        let ctx = Context::new(base, route);
        assert_eq!(ctx.endpoint(), "/ban");
        assert_eq!(ctx.data(), " alice bob");
        assert_eq!(ctx.args(), vec!["alice", "bob"]);
        assert_eq!(ctx.sender().unwrap().id, 7);
        assert_eq!(ctx.recipient(), Some(7));
        assert_eq!(ctx.me().id, 42);
    }

    #[test]
    fn test_callback_data_prefers_route() {
        let base = base(
            r#"{"update_id": 2, "callback_query": {"id": "q", "from": {"id": 3},
                "data": "\fvote|up|3"}}"#,
        );
        let plain = Context::new(base.clone(), Route::new("\u{7}callback"));
        assert_eq!(plain.data(), "\u{c}vote|up|3");

        let route = Route {
            callback_unique: Some("vote".into()),
            callback_data: Some("up|3".into()),
            ..Route::new("\u{c}vote")
        };
        let direct = Context::new(base, route);
        assert_eq!(direct.data(), "up|3");
        assert_eq!(direct.args(), vec!["up", "3"]);
        assert_eq!(direct.callback_unique(), Some("vote"));
        assert_eq!(direct.callback().unwrap().data, "\u{c}vote|up|3");
    }

    #[test]
    fn test_migration_pair() {
        let base = base(
            r#"{"update_id": 3, "message": {"message_id": 1,
                "chat": {"id": -5, "type": "group"}, "migrate_to_chat_id": -1005}}"#,
        );
        let route = Route {
            migrate_from: Some(-5),
            ..Route::new("\u{7}migration")
        };
        assert_eq!(Context::new(base, route).migration(), Some((-5, -1005)));
    }

    #[test]
    fn test_state_shared_across_steps() {
        let base = base(r#"{"update_id": 4, "poll": {"id": "p", "question": "?"}}"#);
        let first = Context::new(base.clone(), Route::new("a"));
        let second = Context::new(base, Route::new("b"));

        first.set_state(5u32);
        assert!(second.has_state::<u32>());
        assert_eq!(second.get_state::<u32>(), Some(5));
        assert_eq!(second.take_state::<u32>(), Some(5));
        assert!(!first.has_state::<u32>());
        assert!(first.chat().is_none());
        assert_eq!(first.data(), "");
    }

    #[test]
    fn test_parse_mode_names() {
        let mode: ParseMode = serde_json::from_str(r#""html""#).unwrap();
        assert_eq!(mode, ParseMode::Html);
        assert_eq!(ParseMode::MarkdownV2.to_string(), "MarkdownV2");
    }
}
