//! The inbound [`Update`] union.
//!
//! On the wire an update is an object with `update_id` and exactly one
//! payload field. Here it becomes a closed enum, [`UpdateKind`], chosen from
//! the first populated wire field in a fixed order. Transport-side metadata
//! rides along in [`UpdateMeta`] and never touches the wire.

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::business::{BusinessConnection, BusinessMessagesDeleted};
use super::member::{
    BoostRemoved, BoostUpdated, ChatJoinRequest, ChatMemberUpdate, MessageReaction,
    MessageReactionCount,
};
use super::message::Message;
use super::payment::{PreCheckoutQuery, ShippingQuery};
use super::query::{Callback, InlineResult, Poll, PollAnswer, Query};

/// The payload of an [`Update`]; exactly one per instance.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    Message(Box<Message>),
    EditedMessage(Box<Message>),
    ChannelPost(Box<Message>),
    EditedChannelPost(Box<Message>),
    MessageReaction(MessageReaction),
    MessageReactionCount(MessageReactionCount),
    Callback(Callback),
    Query(Query),
    InlineResult(InlineResult),
    ShippingQuery(ShippingQuery),
    PreCheckoutQuery(PreCheckoutQuery),
    Poll(Poll),
    PollAnswer(PollAnswer),
    MyChatMember(ChatMemberUpdate),
    ChatMember(ChatMemberUpdate),
    ChatJoinRequest(ChatJoinRequest),
    Boost(BoostUpdated),
    BoostRemoved(BoostRemoved),
    BusinessConnection(BusinessConnection),
    BusinessMessage(Box<Message>),
    EditedBusinessMessage(Box<Message>),
    DeletedBusinessMessages(BusinessMessagesDeleted),
    /// A payload this engine does not model.
    Unsupported,
}

impl UpdateKind {
    /// Short name of the variant, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::EditedMessage(_) => "edited_message",
            Self::ChannelPost(_) => "channel_post",
            Self::EditedChannelPost(_) => "edited_channel_post",
            Self::MessageReaction(_) => "message_reaction",
            Self::MessageReactionCount(_) => "message_reaction_count",
            Self::Callback(_) => "callback_query",
            Self::Query(_) => "inline_query",
            Self::InlineResult(_) => "chosen_inline_result",
            Self::ShippingQuery(_) => "shipping_query",
            Self::PreCheckoutQuery(_) => "pre_checkout_query",
            Self::Poll(_) => "poll",
            Self::PollAnswer(_) => "poll_answer",
            Self::MyChatMember(_) => "my_chat_member",
            Self::ChatMember(_) => "chat_member",
            Self::ChatJoinRequest(_) => "chat_join_request",
            Self::Boost(_) => "chat_boost",
            Self::BoostRemoved(_) => "removed_chat_boost",
            Self::BusinessConnection(_) => "business_connection",
            Self::BusinessMessage(_) => "business_message",
            Self::EditedBusinessMessage(_) => "edited_business_message",
            Self::DeletedBusinessMessages(_) => "deleted_business_messages",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Out-of-band data attached by the transport.
#[derive(Debug, Clone, Default)]
pub struct UpdateMeta {
    /// Secret token that accompanied the update, if any.
    pub secret: Option<String>,
    /// Free-form arguments.
    pub args: HashMap<String, String>,
    /// An error the transport hit while producing this update.
    pub error: Option<Arc<dyn Error + Send + Sync>>,
}

/// One inbound event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawUpdate", into = "RawUpdate")]
pub struct Update {
    pub id: i64,
    pub kind: UpdateKind,
    pub meta: UpdateMeta,
}

impl Update {
    pub fn new(id: i64, kind: UpdateKind) -> Self {
        Self {
            id,
            kind,
            meta: UpdateMeta::default(),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.meta.secret = Some(secret.into());
        self
    }

    pub fn with_args(mut self, args: HashMap<String, String>) -> Self {
        self.meta.args = args;
        self
    }

    pub fn with_error(mut self, error: impl Error + Send + Sync + 'static) -> Self {
        self.meta.error = Some(Arc::new(error));
        self
    }

    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    pub fn edited_message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::EditedMessage(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    pub fn channel_post(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::ChannelPost(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    pub fn edited_channel_post(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::EditedChannelPost(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    pub fn business_message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::BusinessMessage(m) | UpdateKind::EditedBusinessMessage(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    pub fn callback(&self) -> Option<&Callback> {
        match &self.kind {
            UpdateKind::Callback(c) => Some(c),
            _ => None,
        }
    }

    pub fn query(&self) -> Option<&Query> {
        match &self.kind {
            UpdateKind::Query(q) => Some(q),
            _ => None,
        }
    }

    pub fn inline_result(&self) -> Option<&InlineResult> {
        match &self.kind {
            UpdateKind::InlineResult(r) => Some(r),
            _ => None,
        }
    }

    pub fn shipping_query(&self) -> Option<&ShippingQuery> {
        match &self.kind {
            UpdateKind::ShippingQuery(q) => Some(q),
            _ => None,
        }
    }

    pub fn pre_checkout_query(&self) -> Option<&PreCheckoutQuery> {
        match &self.kind {
            UpdateKind::PreCheckoutQuery(q) => Some(q),
            _ => None,
        }
    }

    pub fn poll(&self) -> Option<&Poll> {
        match &self.kind {
            UpdateKind::Poll(p) => Some(p),
            _ => None,
        }
    }

    pub fn poll_answer(&self) -> Option<&PollAnswer> {
        match &self.kind {
            UpdateKind::PollAnswer(a) => Some(a),
            _ => None,
        }
    }

    /// Either kind of chat member update.
    pub fn chat_member(&self) -> Option<&ChatMemberUpdate> {
        match &self.kind {
            UpdateKind::MyChatMember(m) | UpdateKind::ChatMember(m) => Some(m),
            _ => None,
        }
    }

    pub fn chat_join_request(&self) -> Option<&ChatJoinRequest> {
        match &self.kind {
            UpdateKind::ChatJoinRequest(r) => Some(r),
            _ => None,
        }
    }
}

// ─── Wire form ───

/// All-optional wire record, one field per payload.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct RawUpdate {
    update_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edited_message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_post: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edited_channel_post: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_reaction: Option<MessageReaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_reaction_count: Option<MessageReactionCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_query: Option<Callback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_query: Option<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chosen_inline_result: Option<InlineResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_query: Option<ShippingQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pre_checkout_query: Option<PreCheckoutQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    poll: Option<Poll>,
    #[serde(skip_serializing_if = "Option::is_none")]
    poll_answer: Option<PollAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    my_chat_member: Option<ChatMemberUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_member: Option<ChatMemberUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_join_request: Option<ChatJoinRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_boost: Option<BoostUpdated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed_chat_boost: Option<BoostRemoved>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_connection: Option<BusinessConnection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edited_business_message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_business_messages: Option<BusinessMessagesDeleted>,
}

impl From<RawUpdate> for Update {
    fn from(raw: RawUpdate) -> Self {
        let kind = if let Some(m) = raw.message {
            UpdateKind::Message(m)
        } else if let Some(m) = raw.edited_message {
            UpdateKind::EditedMessage(m)
        } else if let Some(m) = raw.channel_post {
            UpdateKind::ChannelPost(m)
        } else if let Some(m) = raw.edited_channel_post {
            UpdateKind::EditedChannelPost(m)
        } else if let Some(r) = raw.message_reaction {
            UpdateKind::MessageReaction(r)
        } else if let Some(r) = raw.message_reaction_count {
            UpdateKind::MessageReactionCount(r)
        } else if let Some(c) = raw.callback_query {
            UpdateKind::Callback(c)
        } else if let Some(q) = raw.inline_query {
            UpdateKind::Query(q)
        } else if let Some(r) = raw.chosen_inline_result {
            UpdateKind::InlineResult(r)
        } else if let Some(q) = raw.shipping_query {
            UpdateKind::ShippingQuery(q)
        } else if let Some(q) = raw.pre_checkout_query {
            UpdateKind::PreCheckoutQuery(q)
        } else if let Some(p) = raw.poll {
            UpdateKind::Poll(p)
        } else if let Some(a) = raw.poll_answer {
            UpdateKind::PollAnswer(a)
        } else if let Some(m) = raw.my_chat_member {
            UpdateKind::MyChatMember(m)
        } else if let Some(m) = raw.chat_member {
            UpdateKind::ChatMember(m)
        } else if let Some(r) = raw.chat_join_request {
            UpdateKind::ChatJoinRequest(r)
        } else if let Some(b) = raw.chat_boost {
            UpdateKind::Boost(b)
        } else if let Some(b) = raw.removed_chat_boost {
            UpdateKind::BoostRemoved(b)
        } else if let Some(c) = raw.business_connection {
            UpdateKind::BusinessConnection(c)
        } else if let Some(m) = raw.business_message {
            UpdateKind::BusinessMessage(m)
        } else if let Some(m) = raw.edited_business_message {
            UpdateKind::EditedBusinessMessage(m)
        } else if let Some(d) = raw.deleted_business_messages {
            UpdateKind::DeletedBusinessMessages(d)
        } else {
            UpdateKind::Unsupported
        };

        Update::new(raw.update_id, kind)
    }
}

impl From<Update> for RawUpdate {
    fn from(update: Update) -> Self {
        let mut raw = RawUpdate {
            update_id: update.id,
            ..Default::default()
        };
        match update.kind {
            UpdateKind::Message(m) => raw.message = Some(m),
            UpdateKind::EditedMessage(m) => raw.edited_message = Some(m),
            UpdateKind::ChannelPost(m) => raw.channel_post = Some(m),
            UpdateKind::EditedChannelPost(m) => raw.edited_channel_post = Some(m),
            UpdateKind::MessageReaction(r) => raw.message_reaction = Some(r),
            UpdateKind::MessageReactionCount(r) => raw.message_reaction_count = Some(r),
            UpdateKind::Callback(c) => raw.callback_query = Some(c),
            UpdateKind::Query(q) => raw.inline_query = Some(q),
            UpdateKind::InlineResult(r) => raw.chosen_inline_result = Some(r),
            UpdateKind::ShippingQuery(q) => raw.shipping_query = Some(q),
            UpdateKind::PreCheckoutQuery(q) => raw.pre_checkout_query = Some(q),
            UpdateKind::Poll(p) => raw.poll = Some(p),
            UpdateKind::PollAnswer(a) => raw.poll_answer = Some(a),
            UpdateKind::MyChatMember(m) => raw.my_chat_member = Some(m),
            UpdateKind::ChatMember(m) => raw.chat_member = Some(m),
            UpdateKind::ChatJoinRequest(r) => raw.chat_join_request = Some(r),
            UpdateKind::Boost(b) => raw.chat_boost = Some(b),
            UpdateKind::BoostRemoved(b) => raw.removed_chat_boost = Some(b),
            UpdateKind::BusinessConnection(c) => raw.business_connection = Some(c),
            UpdateKind::BusinessMessage(m) => raw.business_message = Some(m),
            UpdateKind::EditedBusinessMessage(m) => raw.edited_business_message = Some(m),
            UpdateKind::DeletedBusinessMessages(d) => raw.deleted_business_messages = Some(d),
            UpdateKind::Unsupported => {}
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_populated_field_wins() {
        let u: Update = serde_json::from_str(
            r#"{"update_id": 3,
                "message": {"message_id": 1, "chat": {"id": 1}, "text": "a"},
                "edited_message": {"message_id": 2, "chat": {"id": 1}, "text": "b"}}"#,
        )
        .unwrap();
        assert_eq!(u.id, 3);
        assert_eq!(u.kind.name(), "message");
        assert_eq!(u.message().unwrap().text, "a");
        assert!(u.edited_message().is_none());
    }

    #[test]
    fn test_unknown_payload_is_unsupported() {
        let u: Update =
            serde_json::from_str(r#"{"update_id": 9, "purchased_paid_media": {}}"#).unwrap();
        assert!(matches!(u.kind, UpdateKind::Unsupported));
    }

    #[test]
    fn test_callback_payload() {
        let u: Update = serde_json::from_str(
            r#"{"update_id": 1, "callback_query": {"id": "c", "from": {"id": 5}, "data": "x"}}"#,
        )
        .unwrap();
        assert_eq!(u.callback().unwrap().data, "x");
        assert_eq!(u.kind.name(), "callback_query");
    }

    #[test]
    fn test_wire_form_carries_only_payload() {
        let u = Update::new(4, UpdateKind::Poll(Poll::default())).with_secret("s3cret");
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["update_id"], 4);
        assert!(json.get("poll").is_some());
        assert!(json.get("message").is_none());
        assert!(json.get("secret").is_none());
    }
}
