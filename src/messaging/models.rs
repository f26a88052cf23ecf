//! Telegram Bot API wire types (the subset the bot uses)

use crate::types::{ChatId, IncomingMessage, MessageId};
use serde::{Deserialize, Serialize};

/// Response envelope returned by every Bot API method
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded
    pub ok: bool,
    /// Method result when `ok` is true
    pub result: Option<T>,
    /// Error description when `ok` is false
    pub description: Option<String>,
    /// Error code when `ok` is false
    pub error_code: Option<i64>,
}

/// A Telegram user or bot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Whether this user is a bot
    #[serde(default)]
    pub is_bot: bool,
    /// Username without the leading `@`
    #[serde(default)]
    pub username: Option<String>,
}

/// A chat
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    /// Unique identifier
    pub id: i64,
}

/// A message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    /// Identifier within the chat
    pub message_id: i64,
    /// Chat the message belongs to
    pub chat: Chat,
    /// Sender, absent for channel posts
    #[serde(default)]
    pub from: Option<User>,
    /// Text payload, absent for media messages
    #[serde(default)]
    pub text: Option<String>,
}

impl Message {
    /// Convert into the pipeline's view of an incoming text message
    ///
    /// Returns `None` for messages without text.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let text = self.text?;
        Some(IncomingMessage {
            chat: ChatId(self.chat.id),
            message_id: MessageId(self.message_id),
            text,
        })
    }
}

/// An incoming update from `getUpdates`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    /// Monotonic update identifier, used as the polling offset
    pub update_id: i64,
    /// New incoming message, if this update carries one
    #[serde(default)]
    pub message: Option<Message>,
}
