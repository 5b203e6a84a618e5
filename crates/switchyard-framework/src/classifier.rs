//! Update classification.
//!
//! [`classify`] turns an update into a [`Plan`]: the ordered endpoint keys
//! the dispatcher tries. A step fires only if its key is registered. After
//! an [`Exclusive`](StepMode::Exclusive) step fires, dispatch stops;
//! a [`Notify`](StepMode::Notify) step fires and dispatch continues. Where
//! the decision tree stops unconditionally, the plan simply ends.
//!
//! Message checks run in a fixed priority order:
//!
//! ```text
//! pinned > forward (notify) > text > media > contact .. write access
//!        > added to group > joins > left .. chat created > migration
//!        > video chat .. auto-delete timer
//! ```
//!
//! A text message starting with the event-tag prefix produces no steps past
//! the forward notification: such text could otherwise be mistaken for an
//! event key.

use switchyard_core::{
    CALLBACK_PREFIX, EVENT_PREFIX, Message, On, Route, Update, UpdateKind, User,
};

use crate::command::{parse_callback, parse_command};

/// What happens after a registered step fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Stop dispatching this update.
    Exclusive,
    /// Keep going with the next step.
    Notify,
}

/// One candidate endpoint for an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub route: Route,
    pub mode: StepMode,
}

impl Step {
    pub fn key(&self) -> &str {
        &self.route.key
    }
}

/// The ordered candidates for one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The keys of all steps, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.steps.iter().map(Step::key).collect()
    }

    fn exclusive(&mut self, route: Route) -> &mut Self {
        self.steps.push(Step {
            route,
            mode: StepMode::Exclusive,
        });
        self
    }

    fn notify(&mut self, route: Route) -> &mut Self {
        self.steps.push(Step {
            route,
            mode: StepMode::Notify,
        });
        self
    }

    fn on(&mut self, tag: On) -> &mut Self {
        self.exclusive(Route::new(tag.key()))
    }
}

impl IntoIterator for Plan {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

/// Classifies `update` for a bot whose own user is `me`.
pub fn classify(update: &Update, me: &User) -> Plan {
    let mut plan = Plan::default();

    match &update.kind {
        UpdateKind::Message(m) => classify_message(&mut plan, m, me),
        UpdateKind::EditedMessage(_) => {
            plan.on(On::Edited);
        }
        UpdateKind::ChannelPost(m) => {
            plan.on(if m.pinned.is_some() {
                On::Pinned
            } else {
                On::ChannelPost
            });
        }
        UpdateKind::EditedChannelPost(_) => {
            plan.on(On::EditedChannelPost);
        }
        UpdateKind::MessageReaction(_) => {
            plan.on(On::Reaction);
        }
        UpdateKind::MessageReactionCount(_) => {
            plan.on(On::ReactionCount);
        }
        UpdateKind::Callback(c) => {
            if c.data.starts_with(CALLBACK_PREFIX) {
                if let Some((unique, payload)) = parse_callback(&c.data) {
                    plan.exclusive(Route {
                        callback_unique: Some(unique.to_owned()),
                        callback_data: Some(payload.to_owned()),
                        ..Route::new(format!("{CALLBACK_PREFIX}{unique}"))
                    });
                }
            }
            plan.on(On::Callback);
        }
        UpdateKind::Query(_) => {
            plan.on(On::Query);
        }
        UpdateKind::InlineResult(_) => {
            plan.on(On::InlineResult);
        }
        UpdateKind::ShippingQuery(_) => {
            plan.on(On::Shipping);
        }
        UpdateKind::PreCheckoutQuery(_) => {
            plan.on(On::Checkout);
        }
        UpdateKind::Poll(_) => {
            plan.on(On::Poll);
        }
        UpdateKind::PollAnswer(_) => {
            plan.on(On::PollAnswer);
        }
        UpdateKind::MyChatMember(_) => {
            plan.on(On::MyChatMember);
        }
        UpdateKind::ChatMember(_) => {
            plan.on(On::ChatMember);
        }
        UpdateKind::ChatJoinRequest(_) => {
            plan.on(On::ChatJoinRequest);
        }
        UpdateKind::Boost(_) => {
            plan.on(On::Boost);
        }
        UpdateKind::BoostRemoved(_) => {
            plan.on(On::BoostRemoved);
        }
        UpdateKind::BusinessConnection(_) => {
            plan.on(On::BusinessConnection);
        }
        UpdateKind::BusinessMessage(_) => {
            plan.on(On::BusinessMessage);
        }
        UpdateKind::EditedBusinessMessage(_) => {
            plan.on(On::EditedBusinessMessage);
        }
        UpdateKind::DeletedBusinessMessages(_) => {
            plan.on(On::DeletedBusinessMessages);
        }
        UpdateKind::Unsupported => {}
    }

    plan
}

fn classify_message(plan: &mut Plan, m: &Message, me: &User) {
    if m.pinned.is_some() {
        plan.on(On::Pinned);
        return;
    }

    if m.origin.is_some() {
        plan.notify(Route::new(On::Forward.key()));
    }

    if !m.text.is_empty() {
        classify_text(plan, m, me);
        return;
    }

    // Unhandled media falls through to the content and service checks.
    if let Some(tag) = media_tag(m) {
        plan.on(tag).on(On::Media);
    }

    if let Some(tag) = content_tag(m) {
        plan.on(tag);
        return;
    }

    let was_added = m.user_joined.as_ref().is_some_and(|u| u.id == me.id)
        || m.users_joined
            .as_deref()
            .is_some_and(|users| users.iter().any(|u| u.id == me.id));
    if m.group_created || m.supergroup_created || was_added {
        plan.on(On::AddedToGroup);
        return;
    }

    if m.user_joined.is_some() {
        plan.on(On::UserJoined);
        return;
    }
    if let Some(users) = &m.users_joined {
        for user in users {
            plan.notify(Route {
                joined_user: Some(user.clone()),
                ..Route::new(On::UserJoined.key())
            });
        }
        return;
    }

    if m.migrate_to != 0 {
        if let Some(tag) = membership_tag(m) {
            plan.on(tag);
            return;
        }
        plan.exclusive(Route {
            migrate_from: Some(m.chat.id),
            ..Route::new(On::Migration.key())
        });
        return;
    }

    if let Some(tag) = membership_tag(m).or_else(|| service_tag(m)) {
        plan.on(tag);
    }
}

fn classify_text(plan: &mut Plan, m: &Message, me: &User) {
    if m.text.starts_with(EVENT_PREFIX) {
        return;
    }

    let mut payload = None;
    if let Some(cmd) = parse_command(&m.text) {
        if !cmd.addressed_to(me.username()) {
            return;
        }
        payload = Some(cmd.payload.to_owned());
        plan.exclusive(Route {
            payload: payload.clone(),
            ..Route::new(cmd.name)
        });
    }

    let with_payload = |key: &str| Route {
        payload: payload.clone(),
        ..Route::new(key)
    };

    plan.exclusive(with_payload(&m.text));
    if m.reply_to.is_some() {
        plan.notify(with_payload(On::Reply.key()));
    }
    plan.exclusive(with_payload(On::Text.key()));
}

fn media_tag(m: &Message) -> Option<On> {
    if m.photo.is_some() {
        Some(On::Photo)
    } else if m.voice.is_some() {
        Some(On::Voice)
    } else if m.audio.is_some() {
        Some(On::Audio)
    } else if m.animation.is_some() {
        Some(On::Animation)
    } else if m.document.is_some() {
        Some(On::Document)
    } else if m.sticker.is_some() {
        Some(On::Sticker)
    } else if m.video.is_some() {
        Some(On::Video)
    } else if m.video_note.is_some() {
        Some(On::VideoNote)
    } else {
        None
    }
}

/// Single-field kinds checked between media and membership.
fn content_tag(m: &Message) -> Option<On> {
    let checks = [
        (m.contact.is_some(), On::Contact),
        (m.location.is_some(), On::Location),
        (m.venue.is_some(), On::Venue),
        (m.game.is_some(), On::Game),
        (m.dice.is_some(), On::Dice),
        (m.invoice.is_some(), On::Invoice),
        (m.payment.is_some(), On::Payment),
        (m.refunded_payment.is_some(), On::Refund),
        (m.topic_created.is_some(), On::TopicCreated),
        (m.topic_reopened.is_some(), On::TopicReopened),
        (m.topic_closed.is_some(), On::TopicClosed),
        (m.topic_edited.is_some(), On::TopicEdited),
        (m.general_topic_hidden.is_some(), On::GeneralTopicHidden),
        (m.general_topic_unhidden.is_some(), On::GeneralTopicUnhidden),
        (m.write_access_allowed.is_some(), On::WriteAccessAllowed),
    ];
    first_set(&checks)
}

/// Kinds after the join checks and before migration.
fn membership_tag(m: &Message) -> Option<On> {
    let checks = [
        (m.user_left.is_some(), On::UserLeft),
        (m.users_shared.is_some(), On::UserShared),
        (m.chat_shared.is_some(), On::ChatShared),
        (!m.new_group_title.is_empty(), On::NewGroupTitle),
        (m.new_group_photo.is_some(), On::NewGroupPhoto),
        (m.group_photo_deleted, On::GroupPhotoDeleted),
        (m.group_created, On::GroupCreated),
        (m.supergroup_created, On::SuperGroupCreated),
        (m.channel_created, On::ChannelCreated),
    ];
    first_set(&checks)
}

/// Kinds after migration.
fn service_tag(m: &Message) -> Option<On> {
    let checks = [
        (m.video_chat_started.is_some(), On::VideoChatStarted),
        (m.video_chat_ended.is_some(), On::VideoChatEnded),
        (m.video_chat_participants.is_some(), On::VideoChatParticipants),
        (m.video_chat_scheduled.is_some(), On::VideoChatScheduled),
        (m.web_app.is_some(), On::WebApp),
        (m.proximity_alert.is_some(), On::ProximityAlert),
        (m.auto_delete_timer.is_some(), On::AutoDeleteTimer),
    ];
    first_set(&checks)
}

fn first_set(checks: &[(bool, On)]) -> Option<On> {
    checks.iter().find(|(set, _)| *set).map(|(_, tag)| *tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::update;

    fn me() -> User {
        User {
            id: 42,
            username: Some("yard_bot".into()),
            is_bot: true,
            ..Default::default()
        }
    }

    fn message(fields: &str) -> Update {
        update(&format!(
            r#"{{"update_id": 1, "message": {{"message_id": 1,
                "chat": {{"id": -100, "type": "group"}}, "from": {{"id": 7}} {fields}}}}}"#
        ))
    }

    fn keys(update: &Update) -> Vec<String> {
        classify(update, &me())
            .keys()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    fn tag(on: On) -> String {
        on.key().to_owned()
    }

    #[test]
    fn test_pinned_ends_plan() {
        let u = message(
            r#", "text": "/start", "photo": [{"file_id": "p", "width": 1, "height": 1}],
               "pinned_message": {"message_id": 0, "chat": {"id": -100}}"#,
        );
        assert_eq!(keys(&u), [tag(On::Pinned)]);
    }

    #[test]
    fn test_text_plan_order() {
        let u = message(
            r#", "text": "/start now", "reply_to_message": {"message_id": 0, "chat": {"id": -100}},
               "forward_origin": {"type": "hidden_user", "date": 1, "sender_user_name": "x"}"#,
        );
        let plan = classify(&u, &me());
        assert_eq!(
            plan.keys(),
            [
                On::Forward.key(),
                "/start",
                "/start now",
                On::Reply.key(),
                On::Text.key()
            ]
        );
        let modes: Vec<_> = plan.steps().iter().map(|s| s.mode).collect();
        assert_eq!(
            modes,
            [
                StepMode::Notify,
                StepMode::Exclusive,
                StepMode::Exclusive,
                StepMode::Notify,
                StepMode::Exclusive
            ]
        );
        assert!(
            plan.steps()[1..]
                .iter()
                .all(|s| s.route.payload.as_deref() == Some("now"))
        );
    }

    #[test]
    fn test_command_for_other_bot_is_dropped() {
        assert!(classify(&message(r#", "text": "/start@other_bot""#), &me()).is_empty());
        assert_eq!(
            keys(&message(r#", "text": "/start@YARD_BOT""#))[0],
            "/start"
        );
    }

    #[test]
    fn test_event_prefixed_text_is_dropped() {
        assert!(classify(&message(r#", "text": "\u0007text""#), &me()).is_empty());
    }

    #[test]
    fn test_plain_text_has_no_payload() {
        let plan = classify(&message(r#", "text": "hello""#), &me());
        assert_eq!(plan.keys(), ["hello", On::Text.key()]);
        assert!(plan.steps().iter().all(|s| s.route.payload.is_none()));
    }

    #[test]
    fn test_media_then_fallback() {
        let u = message(r#", "voice": {"file_id": "v"}"#);
        assert_eq!(keys(&u), [tag(On::Voice), tag(On::Media)]);
    }

    #[test]
    fn test_media_continues_to_content() {
        let u = message(
            r#", "photo": [{"file_id": "p", "width": 1, "height": 1}],
               "contact": {"phone_number": "+1", "first_name": "Ann"}"#,
        );
        let plan = classify(&u, &me());
        assert_eq!(plan.keys(), [On::Photo.key(), On::Media.key(), On::Contact.key()]);
        assert!(plan.steps().iter().all(|s| s.mode == StepMode::Exclusive));
    }

    #[test]
    fn test_content_kinds() {
        assert_eq!(
            keys(&message(r#", "dice": {"emoji": "🎲", "value": 3}"#)),
            [tag(On::Dice)]
        );
        assert_eq!(
            keys(&message(r#", "forum_topic_closed": {}"#)),
            [tag(On::TopicClosed)]
        );
    }

    #[test]
    fn test_added_to_group_beats_join() {
        let u = message(r#", "new_chat_members": [{"id": 5}, {"id": 42}]"#);
        assert_eq!(keys(&u), [tag(On::AddedToGroup)]);

        let u = message(r#", "new_chat_member": {"id": 42}"#);
        assert_eq!(keys(&u), [tag(On::AddedToGroup)]);

        let u = message(r#", "group_chat_created": true"#);
        assert_eq!(keys(&u), [tag(On::AddedToGroup)]);
    }

    #[test]
    fn test_users_joined_one_step_each() {
        let u = message(r#", "new_chat_members": [{"id": 5}, {"id": 6}, {"id": 7}]"#);
        let plan = classify(&u, &me());
        assert_eq!(plan.steps().len(), 3);
        let ids: Vec<_> = plan
            .steps()
            .iter()
            .map(|s| {
                assert_eq!(s.mode, StepMode::Notify);
                s.route.joined_user.as_ref().unwrap().id
            })
            .collect();
        assert_eq!(ids, [5, 6, 7]);
    }

    #[test]
    fn test_migration_derives_source() {
        let u = message(r#", "migrate_to_chat_id": -1001"#);
        let plan = classify(&u, &me());
        assert_eq!(plan.keys(), [On::Migration.key()]);
        assert_eq!(plan.steps()[0].route.migrate_from, Some(-100));
    }

    #[test]
    fn test_service_order() {
        let u = message(r#", "new_chat_title": "T", "video_chat_started": {}"#);
        assert_eq!(keys(&u), [tag(On::NewGroupTitle)]);
        let u = message(r#", "message_auto_delete_timer_changed": {"message_auto_delete_time": 60}"#);
        assert_eq!(keys(&u), [tag(On::AutoDeleteTimer)]);
    }

    #[test]
    fn test_callback_unique_then_fallback() {
        let u = update(
            r#"{"update_id": 2, "callback_query": {"id": "c", "from": {"id": 7},
                "data": "\fvote|up"}}"#,
        );
        let plan = classify(&u, &me());
        assert_eq!(plan.keys(), ["\u{c}vote", On::Callback.key()]);
        let direct = &plan.steps()[0].route;
        assert_eq!(direct.callback_unique.as_deref(), Some("vote"));
        assert_eq!(direct.callback_data.as_deref(), Some("up"));
        assert_eq!(plan.steps()[1].route.callback_data, None);
    }

    #[test]
    fn test_plain_callback() {
        let u = update(
            r#"{"update_id": 2, "callback_query": {"id": "c", "from": {"id": 7}, "data": "raw"}}"#,
        );
        assert_eq!(classify(&u, &me()).keys(), [On::Callback.key()]);
    }

    #[test]
    fn test_top_level_kinds() {
        let cases = [
            (r#""edited_message": {"message_id": 1, "chat": {"id": 1}}"#, On::Edited),
            (
                r#""channel_post": {"message_id": 1, "chat": {"id": 1}, "text": "x"}"#,
                On::ChannelPost,
            ),
            (
                r#""channel_post": {"message_id": 1, "chat": {"id": 1},
                    "pinned_message": {"message_id": 0, "chat": {"id": 1}}}"#,
                On::Pinned,
            ),
            (r#""inline_query": {"id": "q", "from": {"id": 1}, "query": "x"}"#, On::Query),
            (r#""poll": {"id": "p", "question": "?"}"#, On::Poll),
            (r#""poll_answer": {"poll_id": "p"}"#, On::PollAnswer),
            (
                r#""removed_chat_boost": {"chat": {"id": 1}, "boost_id": "b", "remove_date": 1}"#,
                On::BoostRemoved,
            ),
            (
                r#""deleted_business_messages": {"business_connection_id": "b", "chat": {"id": 1}}"#,
                On::DeletedBusinessMessages,
            ),
        ];
        for (payload, expected) in cases {
            let u = update(&format!(r#"{{"update_id": 1, {payload}}}"#));
            assert_eq!(keys(&u), [tag(expected)], "payload {payload}");
        }
    }

    #[test]
    fn test_unsupported_has_empty_plan() {
        let u = update(r#"{"update_id": 1}"#);
        assert!(classify(&u, &me()).is_empty());
    }
}
