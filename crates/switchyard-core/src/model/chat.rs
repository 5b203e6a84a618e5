//! Users and chats.

use serde::{Deserialize, Serialize};

/// A platform user or bot account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique numeric identifier.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Username, without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    /// `true` if this user is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// `true` if this user is a premium subscriber.
    #[serde(default)]
    pub is_premium: bool,
}

impl User {
    /// Returns the username or an empty string when none is set.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }
}

/// The kind of a [`Chat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    #[default]
    Private,
    Group,
    Supergroup,
    Channel,
}

/// A conversation: private chat, group, supergroup or channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique numeric identifier.
    pub id: i64,
    /// Chat type.
    #[serde(default, rename = "type")]
    pub kind: ChatType,
    /// Title for groups, supergroups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Username for private chats, supergroups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// First name of the other party in a private chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// `true` if the supergroup has topics enabled.
    #[serde(default)]
    pub is_forum: bool,
}

impl Chat {
    /// Returns `true` for groups and supergroups.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatType::Group | ChatType::Supergroup)
    }
}

/// A chat photo, as sizes of the current profile photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPhoto {
    pub small_file_id: String,
    pub big_file_id: String,
}
