//! Data model for inbound updates.
//!
//! These types mirror the platform's JSON objects closely enough for
//! dispatch and typical handlers. Fields the engine never inspects are
//! left out and ignored when deserialising.

mod business;
mod chat;
mod markup;
mod media;
mod member;
mod message;
mod payment;
mod query;
mod service;
mod update;

pub use business::{BusinessConnection, BusinessMessagesDeleted};
pub use chat::{Chat, ChatPhoto, ChatType, User};
pub use markup::{Btn, InlineButton, ReplyButton};
pub use media::{
    Animation, Audio, Contact, Dice, Document, FileRef, Game, Location, PhotoSize, Sticker, Venue,
    Video, VideoNote, Voice,
};
pub use member::{
    Boost, BoostRemoved, BoostUpdated, ChatJoinRequest, ChatMember, ChatMemberUpdate,
    MessageReaction, MessageReactionCount, Reaction, ReactionCount,
};
pub use message::{ForwardOrigin, Message};
pub use payment::{
    Invoice, Payment, PreCheckoutQuery, RefundedPayment, ShippingAddress, ShippingQuery,
};
pub use query::{Callback, InlineResult, Poll, PollAnswer, PollOption, Query};
pub use service::{
    AutoDeleteTimer, ChatShared, GeneralTopicHidden, GeneralTopicUnhidden, ProximityAlert,
    SharedUser, TopicClosed, TopicCreated, TopicEdited, TopicReopened, UsersShared,
    VideoChatEnded, VideoChatParticipants, VideoChatScheduled, VideoChatStarted, WebAppData,
    WriteAccessAllowed,
};
pub use update::{Update, UpdateKind, UpdateMeta};
