//! Messaging collaborator
//!
//! The pipeline talks to the chat platform only through the [`Messenger`]
//! trait. [`TelegramClient`] implements it over the Telegram Bot API and also
//! provides the long-polling used by the dispatcher.

mod models;
mod telegram;
mod traits;

pub use models::{ApiResponse, Chat, Message, Update, User};
pub use telegram::TelegramClient;
pub use traits::Messenger;
