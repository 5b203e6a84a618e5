//! Chat membership, join requests, boosts and reactions.

use serde::{Deserialize, Serialize};

use super::chat::{Chat, User};

/// A member's status in a chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user: User,
    /// One of `creator`, `administrator`, `member`, `restricted`, `left`, `kicked`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until_date: Option<i64>,
}

/// A change of a member's status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMemberUpdate {
    pub chat: Chat,
    pub from: User,
    pub date: i64,
    #[serde(rename = "old_chat_member")]
    pub old: ChatMember,
    #[serde(rename = "new_chat_member")]
    pub new: ChatMember,
    #[serde(default)]
    pub via_join_request: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatJoinRequest {
    pub chat: Chat,
    #[serde(rename = "from")]
    pub sender: User,
    #[serde(default)]
    pub user_chat_id: i64,
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boost {
    pub boost_id: String,
    pub add_date: i64,
    pub expiration_date: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostUpdated {
    pub chat: Chat,
    pub boost: Boost,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostRemoved {
    pub chat: Chat,
    pub boost_id: String,
    pub remove_date: i64,
}

/// An emoji or custom-emoji reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reaction {
    Emoji { emoji: String },
    CustomEmoji { custom_emoji_id: String },
    Paid,
}

/// A user changed their reactions on a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReaction {
    pub chat: Chat,
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_chat: Option<Chat>,
    pub date: i64,
    #[serde(default)]
    pub old_reaction: Vec<Reaction>,
    #[serde(default)]
    pub new_reaction: Vec<Reaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    #[serde(rename = "type")]
    pub reaction: Reaction,
    pub total_count: i64,
}

/// Anonymous reaction totals on a message changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReactionCount {
    pub chat: Chat,
    pub message_id: i64,
    pub date: i64,
    #[serde(default)]
    pub reactions: Vec<ReactionCount>,
}
