//! Command and callback-data grammars.
//!
//! ```text
//! command  := "/" word ("@" botname)? (space | end) payload?
//! callback := "\f" unique ("|" payload)?
//! ```
//!
//! Word characters are ASCII `[0-9A-Za-z_]`; a callback unique may also
//! contain `-`. A command payload runs to the end of the first line.

use std::sync::LazyLock;

use regex::Regex;

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(/[0-9A-Za-z_]+)(@([0-9A-Za-z_]+))?([\t\n\x0C\r ]|$)(.+)?")
        .expect("command regex")
});

static CALLBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\x0C([-0-9A-Za-z_]+)(\|(.+))?$").expect("callback regex"));

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    /// The command with its slash, without the bot suffix: `/start`.
    pub name: &'a str,
    /// The `@botname` suffix, without the `@`.
    pub bot_name: Option<&'a str>,
    /// Everything after the separator up to the end of the line.
    pub payload: &'a str,
}

impl Command<'_> {
    /// Returns `true` if the command carries no bot suffix or names `username`
    /// (case-insensitively).
    pub fn addressed_to(&self, username: &str) -> bool {
        self.bot_name
            .is_none_or(|name| name.eq_ignore_ascii_case(username))
    }
}

/// Parses `text` as a command.
pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let caps = COMMAND_RE.captures(text)?;
    Some(Command {
        name: caps.get(1)?.as_str(),
        bot_name: caps.get(3).map(|m| m.as_str()),
        payload: caps.get(5).map_or("", |m| m.as_str()),
    })
}

/// Parses prefixed callback data into `(unique, payload)`, the unique
/// without its prefix.
pub fn parse_callback(data: &str) -> Option<(&str, &str)> {
    let caps = CALLBACK_RE.captures(data)?;
    let unique = caps.get(1)?.as_str();
    let payload = caps.get(3).map_or("", |m| m.as_str());
    Some((unique, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_command() {
        let cmd = parse_command("/start").unwrap();
        assert_eq!(cmd.name, "/start");
        assert_eq!(cmd.bot_name, None);
        assert_eq!(cmd.payload, "");
    }

    #[test]
    fn test_command_with_bot_and_payload() {
        let cmd = parse_command("/ban@Yard_Bot alice for spam").unwrap();
        assert_eq!(cmd.name, "/ban");
        assert_eq!(cmd.bot_name, Some("Yard_Bot"));
        assert_eq!(cmd.payload, "alice for spam");
        assert!(cmd.addressed_to("yard_bot"));
        assert!(!cmd.addressed_to("other_bot"));
    }

    #[test]
    fn test_payload_stops_at_line_end() {
        let cmd = parse_command("/note first\nsecond").unwrap();
        assert_eq!(cmd.payload, "first");

        let cmd = parse_command("/note\nbody").unwrap();
        assert_eq!(cmd.payload, "body");
    }

    #[test]
    fn test_not_commands() {
        assert!(parse_command("start").is_none());
        assert!(parse_command("/").is_none());
        assert!(parse_command("/start-now").is_none());
        assert!(parse_command("/старт").is_none());
        assert!(parse_command("hello /start").is_none());
    }

    #[test]
    fn test_callback_grammar() {
        assert_eq!(parse_callback("\u{c}like"), Some(("like", "")));
        assert_eq!(parse_callback("\u{c}vote-up|3|a"), Some(("vote-up", "3|a")));
        assert_eq!(parse_callback("\u{c}x|"), None);
        assert_eq!(parse_callback("like|1"), None);
        assert_eq!(parse_callback("\u{c}bad unique"), None);
    }
}
