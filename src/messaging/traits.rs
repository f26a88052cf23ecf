//! Messaging trait used by the delivery pipeline

use crate::error::TelegramError;
use crate::types::{ChatId, MessageHandle, MessageId};
use async_trait::async_trait;
use std::path::Path;

/// Operations the pipeline needs from the chat platform
///
/// Every method addresses a chat or a previously sent message; implementations
/// hold no per-request state, so one instance is shared by all requests.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message, optionally as a reply, and return its handle
    async fn send_text(
        &self,
        chat: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> Result<MessageHandle, TelegramError>;

    /// Replace the text of a message the bot sent earlier
    async fn edit_text(&self, handle: MessageHandle, text: &str) -> Result<(), TelegramError>;

    /// Delete a message the bot sent earlier
    async fn delete_message(&self, handle: MessageHandle) -> Result<(), TelegramError>;

    /// Upload the file at `video` as a streamable video with a caption
    ///
    /// The file is read once; the caller still owns it and removes it afterwards.
    async fn send_video(
        &self,
        chat: ChatId,
        reply_to: Option<MessageId>,
        video: &Path,
        caption: &str,
    ) -> Result<(), TelegramError>;
}
