//! Endpoint keys: the shared namespace of commands, event tags and
//! callback-button identifiers.
//!
//! All three live in one string-keyed table. Event tags start with
//! [`EVENT_PREFIX`] and callback uniques with [`CALLBACK_PREFIX`]; neither
//! control byte appears at the start of ordinary typed text, so the domains
//! cannot collide.
//!
//! ```rust,ignore
//! router.handle("/start", on_start);
//! router.handle(On::Photo, on_photo);
//! router.handle(&like_button, on_like);
//! ```

use std::fmt;

/// First byte of every event tag (BEL).
pub const EVENT_PREFIX: char = '\u{7}';

/// First byte of every callback unique (form feed).
pub const CALLBACK_PREFIX: char = '\u{c}';

macro_rules! event_tags {
    ($($(#[$doc:meta])* $variant:ident => $key:literal,)+) => {
        /// Symbolic event tags.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum On {
            $($(#[$doc])* $variant,)+
        }

        impl On {
            /// Every tag, in declaration order.
            pub const ALL: &'static [On] = &[$(On::$variant,)+];

            /// The registry key of this tag.
            pub fn key(self) -> &'static str {
                match self {
                    $(On::$variant => concat!("\u{7}", $key),)+
                }
            }
        }
    };
}

event_tags! {
    /// Catch-all for text messages.
    Text => "text",
    /// A forwarded message. Fires as a notification before further checks.
    Forward => "forward",
    /// A text message replying to another message.
    Reply => "reply",
    Edited => "edited",
    Photo => "photo",
    Voice => "voice",
    Audio => "audio",
    Animation => "animation",
    Document => "document",
    Sticker => "sticker",
    Video => "video",
    VideoNote => "video_note",
    /// Fallback for any media kind without its own handler.
    Media => "media",
    Contact => "contact",
    Location => "location",
    Venue => "venue",
    Game => "game",
    Dice => "dice",
    Invoice => "invoice",
    Payment => "payment",
    Refund => "refund",
    TopicCreated => "topic_created",
    TopicReopened => "topic_reopened",
    TopicClosed => "topic_closed",
    TopicEdited => "topic_edited",
    GeneralTopicHidden => "general_topic_hidden",
    GeneralTopicUnhidden => "general_topic_unhidden",
    WriteAccessAllowed => "write_access_allowed",
    Pinned => "pinned",
    ChannelPost => "channel_post",
    EditedChannelPost => "edited_channel_post",
    /// The bot itself was added to a group, or a group was created with it.
    AddedToGroup => "added_to_group",
    UserJoined => "user_joined",
    UserLeft => "user_left",
    UserShared => "user_shared",
    ChatShared => "chat_shared",
    NewGroupTitle => "new_chat_title",
    NewGroupPhoto => "new_chat_photo",
    GroupPhotoDeleted => "group_photo_deleted",
    GroupCreated => "group_created",
    SuperGroupCreated => "supergroup_created",
    ChannelCreated => "channel_created",
    /// A group was upgraded to a supergroup.
    Migration => "migration",
    VideoChatStarted => "video_chat_started",
    VideoChatEnded => "video_chat_ended",
    VideoChatParticipants => "video_chat_participants_invited",
    VideoChatScheduled => "video_chat_scheduled",
    WebApp => "web_app",
    ProximityAlert => "proximity_alert_triggered",
    AutoDeleteTimer => "auto_delete_timer_changed",
    Reaction => "reaction",
    ReactionCount => "reaction_count",
    Callback => "callback",
    Query => "query",
    InlineResult => "inline_result",
    Shipping => "shipping_query",
    Checkout => "pre_checkout_query",
    Poll => "poll",
    PollAnswer => "poll_answer",
    MyChatMember => "my_chat_member",
    ChatMember => "chat_member",
    ChatJoinRequest => "chat_join_request",
    Boost => "boost_updated",
    BoostRemoved => "boost_removed",
    BusinessConnection => "business_connection",
    BusinessMessage => "business_message",
    EditedBusinessMessage => "edited_business_message",
    DeletedBusinessMessages => "deleted_business_messages",
}

impl fmt::Display for On {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key()[EVENT_PREFIX.len_utf8()..])
    }
}

/// Anything with a callback-unique identity usable as an endpoint.
pub trait CallbackEndpoint {
    /// The deterministic key this value registers under.
    fn callback_unique(&self) -> String;
}

/// A registrable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// A command (`"/start"`) or exact phrase.
    Text(String),
    Event(On),
    /// A callback unique, already carrying its prefix if it needs one.
    Callback(String),
}

impl Endpoint {
    /// The registry key. Every endpoint has one, the empty string included.
    pub fn key(&self) -> String {
        match self {
            Endpoint::Text(s) | Endpoint::Callback(s) => s.clone(),
            Endpoint::Event(on) => on.key().to_owned(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Text(s) => f.write_str(s),
            Endpoint::Event(on) => write!(f, "on_{on}"),
            Endpoint::Callback(s) => {
                f.write_str(s.strip_prefix(CALLBACK_PREFIX).unwrap_or(s))
            }
        }
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Endpoint::Text(s.to_owned())
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Endpoint::Text(s)
    }
}

impl From<On> for Endpoint {
    fn from(on: On) -> Self {
        Endpoint::Event(on)
    }
}

impl<T: CallbackEndpoint> From<&T> for Endpoint {
    fn from(value: &T) -> Self {
        Endpoint::Callback(value.callback_unique())
    }
}

/// Renders a registry key for logs, replacing the control prefixes.
pub fn display_key(key: &str) -> String {
    if let Some(tag) = key.strip_prefix(EVENT_PREFIX) {
        format!("on_{tag}")
    } else if let Some(unique) = key.strip_prefix(CALLBACK_PREFIX) {
        format!("btn:{unique}")
    } else {
        key.to_owned()
    }
}
