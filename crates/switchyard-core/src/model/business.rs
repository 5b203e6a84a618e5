//! Business account connections.

use serde::{Deserialize, Serialize};

use super::chat::{Chat, User};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessConnection {
    pub id: String,
    pub user: User,
    pub user_chat_id: i64,
    pub date: i64,
    #[serde(default)]
    pub can_reply: bool,
    #[serde(default)]
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessMessagesDeleted {
    pub business_connection_id: String,
    pub chat: Chat,
    #[serde(default)]
    pub message_ids: Vec<i64>,
}
