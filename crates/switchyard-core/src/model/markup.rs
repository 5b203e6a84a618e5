//! Keyboard buttons usable as registrable endpoints.

use serde::{Deserialize, Serialize};

use crate::endpoint::{CALLBACK_PREFIX, CallbackEndpoint};

/// A button of an inline keyboard.
///
/// The `unique` identifier routes presses of this button to its handler;
/// `data` travels along as the callback payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineButton {
    pub unique: String,
    pub text: String,
    pub data: String,
    pub url: Option<String>,
}

impl InlineButton {
    pub fn new(unique: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            unique: unique.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Sets the payload carried by presses of this button.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    /// Wire callback data: `"\f<unique>|<data>"`, or `"\f<unique>"` when the
    /// payload is empty.
    pub fn callback_data(&self) -> String {
        if self.data.is_empty() {
            format!("{CALLBACK_PREFIX}{}", self.unique)
        } else {
            format!("{CALLBACK_PREFIX}{}|{}", self.unique, self.data)
        }
    }
}

impl CallbackEndpoint for InlineButton {
    fn callback_unique(&self) -> String {
        format!("{CALLBACK_PREFIX}{}", self.unique)
    }
}

/// A button of a reply keyboard. Pressing it sends its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyButton {
    pub text: String,
}

impl ReplyButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CallbackEndpoint for ReplyButton {
    fn callback_unique(&self) -> String {
        self.text.clone()
    }
}

/// A button reference that becomes either kind of button.
///
/// With a `unique` it behaves like an [`InlineButton`]; without one it is a
/// [`ReplyButton`] routed by its text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Btn {
    pub unique: String,
    pub text: String,
    pub data: String,
}

impl Btn {
    pub fn inline(&self) -> InlineButton {
        InlineButton {
            unique: self.unique.clone(),
            text: self.text.clone(),
            data: self.data.clone(),
            url: None,
        }
    }

    pub fn reply(&self) -> ReplyButton {
        ReplyButton::new(self.text.clone())
    }
}

impl CallbackEndpoint for Btn {
    fn callback_unique(&self) -> String {
        if self.unique.is_empty() {
            self.text.clone()
        } else {
            format!("{CALLBACK_PREFIX}{}", self.unique)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_unique_prefixed() {
        let b = InlineButton::new("like", "👍");
        assert_eq!(b.callback_unique(), "\u{c}like");
        assert_eq!(b.callback_data(), "\u{c}like");
        assert_eq!(b.with_data("42").callback_data(), "\u{c}like|42");
    }

    #[test]
    fn test_reply_unique_is_text() {
        assert_eq!(ReplyButton::new("Menu").callback_unique(), "Menu");
    }

    #[test]
    fn test_btn_unique() {
        let inline = Btn {
            unique: "next".into(),
            text: "Next".into(),
            data: String::new(),
        };
        let reply = Btn {
            text: "Help".into(),
            ..Default::default()
        };
        assert_eq!(inline.callback_unique(), "\u{c}next");
        assert_eq!(inline.inline().callback_unique(), inline.callback_unique());
        assert_eq!(reply.callback_unique(), "Help");
        assert_eq!(reply.reply().callback_unique(), "Help");
    }
}
