//! The [`Message`] record and its forward origin.
//!
//! A message carries at most one sub-kind in well-formed input: text, one of
//! the media fields, or one of the service payloads. Every sub-kind field is
//! optional so that partial wire payloads still deserialise.

use serde::{Deserialize, Serialize};

use super::chat::{Chat, ChatPhoto, User};
use super::media::{
    Animation, Audio, Contact, Dice, Document, Game, Location, PhotoSize, Sticker, Venue, Video,
    VideoNote, Voice,
};
use super::payment::{Invoice, Payment, RefundedPayment};
use super::service::{
    AutoDeleteTimer, ChatShared, GeneralTopicHidden, GeneralTopicUnhidden, ProximityAlert,
    TopicClosed, TopicCreated, TopicEdited, TopicReopened, UsersShared, VideoChatEnded,
    VideoChatParticipants, VideoChatScheduled, VideoChatStarted, WebAppData, WriteAccessAllowed,
};

/// Where a forwarded message originally came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForwardOrigin {
    User {
        date: i64,
        sender_user: User,
    },
    HiddenUser {
        date: i64,
        sender_user_name: String,
    },
    Chat {
        date: i64,
        sender_chat: Chat,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author_signature: Option<String>,
    },
    Channel {
        date: i64,
        chat: Chat,
        message_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author_signature: Option<String>,
    },
}

impl ForwardOrigin {
    /// Unix time the original message was sent.
    pub fn date(&self) -> i64 {
        match self {
            Self::User { date, .. }
            | Self::HiddenUser { date, .. }
            | Self::Chat { date, .. }
            | Self::Channel { date, .. } => *date,
        }
    }
}

/// A message in a chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    #[serde(rename = "message_id")]
    pub id: i64,
    #[serde(rename = "message_thread_id", skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,
    pub chat: Chat,
    pub date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_connection_id: Option<String>,

    #[serde(rename = "forward_origin", skip_serializing_if = "Option::is_none")]
    pub origin: Option<ForwardOrigin>,
    #[serde(rename = "reply_to_message", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Box<Message>>,
    #[serde(rename = "pinned_message", skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_bot: Option<User>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caption: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<Sticker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_note: Option<VideoNote>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<Game>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dice: Option<Dice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    #[serde(rename = "successful_payment", skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_payment: Option<RefundedPayment>,

    #[serde(rename = "forum_topic_created", skip_serializing_if = "Option::is_none")]
    pub topic_created: Option<TopicCreated>,
    #[serde(rename = "forum_topic_reopened", skip_serializing_if = "Option::is_none")]
    pub topic_reopened: Option<TopicReopened>,
    #[serde(rename = "forum_topic_closed", skip_serializing_if = "Option::is_none")]
    pub topic_closed: Option<TopicClosed>,
    #[serde(rename = "forum_topic_edited", skip_serializing_if = "Option::is_none")]
    pub topic_edited: Option<TopicEdited>,
    #[serde(
        rename = "general_forum_topic_hidden",
        skip_serializing_if = "Option::is_none"
    )]
    pub general_topic_hidden: Option<GeneralTopicHidden>,
    #[serde(
        rename = "general_forum_topic_unhidden",
        skip_serializing_if = "Option::is_none"
    )]
    pub general_topic_unhidden: Option<GeneralTopicUnhidden>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_access_allowed: Option<WriteAccessAllowed>,

    #[serde(rename = "group_chat_created")]
    pub group_created: bool,
    #[serde(rename = "supergroup_chat_created")]
    pub supergroup_created: bool,
    #[serde(rename = "channel_chat_created")]
    pub channel_created: bool,

    #[serde(rename = "new_chat_member", skip_serializing_if = "Option::is_none")]
    pub user_joined: Option<User>,
    #[serde(rename = "new_chat_members", skip_serializing_if = "Option::is_none")]
    pub users_joined: Option<Vec<User>>,
    #[serde(rename = "left_chat_member", skip_serializing_if = "Option::is_none")]
    pub user_left: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_shared: Option<UsersShared>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_shared: Option<ChatShared>,

    #[serde(rename = "new_chat_title", skip_serializing_if = "String::is_empty")]
    pub new_group_title: String,
    #[serde(rename = "new_chat_photo", skip_serializing_if = "Option::is_none")]
    pub new_group_photo: Option<Vec<PhotoSize>>,
    #[serde(rename = "delete_chat_photo")]
    pub group_photo_deleted: bool,

    /// Target supergroup id when a group was upgraded.
    #[serde(rename = "migrate_to_chat_id")]
    pub migrate_to: i64,
    /// Source group id, set on the first message of an upgraded supergroup.
    #[serde(rename = "migrate_from_chat_id")]
    pub migrate_from: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_chat_started: Option<VideoChatStarted>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_chat_ended: Option<VideoChatEnded>,
    #[serde(
        rename = "video_chat_participants_invited",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_chat_participants: Option<VideoChatParticipants>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_chat_scheduled: Option<VideoChatScheduled>,

    #[serde(rename = "web_app_data", skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppData>,
    #[serde(
        rename = "proximity_alert_triggered",
        skip_serializing_if = "Option::is_none"
    )]
    pub proximity_alert: Option<ProximityAlert>,
    #[serde(
        rename = "message_auto_delete_timer_changed",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_delete_timer: Option<AutoDeleteTimer>,
}

impl Message {
    /// Returns `true` if the message replies to another message.
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    pub fn is_forwarded(&self) -> bool {
        self.origin.is_some()
    }

    /// Returns `true` for messages sent in a private chat.
    pub fn is_private(&self) -> bool {
        self.chat.kind == super::chat::ChatType::Private
    }

    /// Returns `true` if the message carries one of the 8 media attachments.
    pub fn has_media(&self) -> bool {
        self.photo.is_some()
            || self.voice.is_some()
            || self.audio.is_some()
            || self.animation.is_some()
            || self.document.is_some()
            || self.sticker.is_some()
            || self.video.is_some()
            || self.video_note.is_some()
    }

    /// Returns `true` for service messages: membership changes, chat
    /// lifecycle markers, pins, migrations and similar.
    pub fn is_service(&self) -> bool {
        self.pinned.is_some()
            || self.user_joined.is_some()
            || self.users_joined.is_some()
            || self.user_left.is_some()
            || !self.new_group_title.is_empty()
            || self.new_group_photo.is_some()
            || self.group_photo_deleted
            || self.group_created
            || self.supergroup_created
            || self.channel_created
            || self.migrate_to != 0
            || self.migrate_from != 0
            || self.topic_created.is_some()
            || self.topic_reopened.is_some()
            || self.topic_closed.is_some()
            || self.topic_edited.is_some()
            || self.video_chat_started.is_some()
            || self.video_chat_ended.is_some()
            || self.video_chat_participants.is_some()
            || self.video_chat_scheduled.is_some()
            || self.auto_delete_timer.is_some()
    }

    /// Identifier of the chat the message was sent on behalf of, falling
    /// back to the containing chat.
    pub fn sender_chat_id(&self) -> i64 {
        self.sender_chat.as_ref().map_or(self.chat.id, |c| c.id)
    }

    /// The largest photo size, if the message carries a photo.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .as_deref()
            .and_then(|sizes| sizes.iter().max_by_key(|p| p.width * p.height))
    }

    /// The new chat photo, as the largest available size.
    pub fn new_chat_photo(&self) -> Option<ChatPhoto> {
        let sizes = self.new_group_photo.as_deref()?;
        let small = sizes.first()?;
        let big = sizes.last()?;
        Some(ChatPhoto {
            small_file_id: small.file.file_id.clone(),
            big_file_id: big.file.file_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::chat::ChatType;

    #[test]
    fn test_partial_payload_deserialises() {
        let m: Message = serde_json::from_str(
            r#"{"message_id": 7, "chat": {"id": -100, "type": "supergroup"}, "text": "hi"}"#,
        )
        .unwrap();
        assert_eq!(m.id, 7);
        assert_eq!(m.chat.kind, ChatType::Supergroup);
        assert_eq!(m.text, "hi");
        assert!(!m.has_media());
        assert!(!m.is_service());
    }

    #[test]
    fn test_forward_origin_tagged() {
        let m: Message = serde_json::from_str(
            r#"{"message_id": 1, "chat": {"id": 1},
                "forward_origin": {"type": "hidden_user", "date": 5, "sender_user_name": "x"}}"#,
        )
        .unwrap();
        assert!(m.is_forwarded());
        assert_eq!(m.origin.unwrap().date(), 5);
    }

    #[test]
    fn test_service_markers() {
        let m: Message = serde_json::from_str(
            r#"{"message_id": 1, "chat": {"id": -5, "type": "group"}, "migrate_to_chat_id": -1005}"#,
        )
        .unwrap();
        assert_eq!(m.migrate_to, -1005);
        assert!(m.is_service());
        assert_eq!(m.sender_chat_id(), -5);
    }

    #[test]
    fn test_largest_photo() {
        let m: Message = serde_json::from_str(
            r#"{"message_id": 1, "chat": {"id": 1}, "photo": [
                {"file_id": "s", "width": 90, "height": 90},
                {"file_id": "l", "width": 800, "height": 600}]}"#,
        )
        .unwrap();
        assert!(m.has_media());
        assert_eq!(m.largest_photo().unwrap().file.file_id, "l");
    }
}
