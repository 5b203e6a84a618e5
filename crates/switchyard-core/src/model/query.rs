//! Callback queries, inline queries and polls.

use serde::{Deserialize, Serialize};

use super::chat::{Chat, User};
use super::media::Location;
use super::message::Message;

/// A press of an inline keyboard button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Callback {
    pub id: String,
    pub from: User,
    /// The message the button was attached to, if it is still accessible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<Message>>,
    /// Identifier of the inline message the button was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    #[serde(default)]
    pub chat_instance: String,
    /// Raw callback data as sent by the platform.
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_short_name: Option<String>,
}

impl Callback {
    /// Returns `true` if the button was attached to an inline message.
    pub fn is_inline(&self) -> bool {
        self.inline_message_id.is_some()
    }
}

/// An incoming inline query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub id: String,
    pub from: User,
    #[serde(rename = "query")]
    pub text: String,
    #[serde(default)]
    pub offset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// An inline result the user chose and sent to a chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineResult {
    #[serde(rename = "result_id")]
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    pub voter_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub total_voter_count: i64,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// A vote in a non-anonymous poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollAnswer {
    pub poll_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_chat: Option<Chat>,
    #[serde(default)]
    pub option_ids: Vec<i32>,
}
