//! Wire types for the bot platform. Only the fields the receiver reads are modelled.

use serde::{Deserialize, Serialize};

use crate::channels::is_valid_username;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Envelope every API method answers with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Commands the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Channel(String),
    Logo,
    Unknown,
}

impl Command {
    /// Parse a message text. Commands may carry a `@botname` suffix as sent in group chats.
    /// A `/channel` argument that is not a plain handle falls back to help.
    pub fn parse(text: &str) -> Self {
        let mut words = text.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Unknown;
        };
        let name = head.split('@').next().unwrap_or(head);

        match name {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/logo" => Command::Logo,
            "/channel" => match words.next().map(|w| w.trim_start_matches('@')) {
                Some(username) if is_valid_username(username) => {
                    Command::Channel(username.to_string())
                }
                _ => Command::Help,
            },
            _ => Command::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/start@tgscout_bot"), Command::Start);
        assert_eq!(Command::parse("  /help  "), Command::Help);
        assert_eq!(Command::parse("/logo"), Command::Logo);
        assert_eq!(
            Command::parse("/channel @durov"),
            Command::Channel("durov".to_string())
        );
        assert_eq!(
            Command::parse("/channel@tgscout_bot telegram extra"),
            Command::Channel("telegram".to_string())
        );
        assert_eq!(Command::parse("/channel"), Command::Help);
        assert_eq!(Command::parse("/channel @"), Command::Help);
        assert_eq!(Command::parse("/channel x?y#z"), Command::Help);
        assert_eq!(Command::parse("/channel ../s/other"), Command::Help);
        assert_eq!(Command::parse("hello"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
    }

    #[test]
    fn test_update_ignores_unknown_fields() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 10, "message": {"message_id": 1, "date": 0,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 7, "is_bot": false, "first_name": "A"},
                "text": "/start"}}"#,
        )
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/start"));

        let update: Update =
            serde_json::from_str(r#"{"update_id": 11, "edited_message": {}}"#).unwrap();
        assert!(update.message.is_none());
    }
}
