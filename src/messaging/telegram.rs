//! Telegram Bot API client

use super::models::{ApiResponse, Message, Update, User};
use super::traits::Messenger;
use crate::config::TelegramConfig;
use crate::error::TelegramError;
use crate::types::{ChatId, MessageHandle, MessageId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;

/// Telegram Bot API client
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl TelegramClient {
    /// Create a new Telegram client
    ///
    /// `api_url` is the Bot API root (normally `https://api.telegram.org`).
    pub fn new(
        client: Client,
        api_url: &str,
        bot_token: &str,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), bot_token),
            request_timeout,
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self::new(
            Client::new(),
            &config.api_url,
            &config.bot_token,
            config.request_timeout,
        )
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Send a request and unwrap the Bot API envelope
    async fn execute<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<T, TelegramError> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    code: i64::from(status.as_u16()),
                    description: body,
                });
            }
            Err(e) => {
                return Err(TelegramError::InvalidResponse(format!(
                    "{method}: cannot decode response: {e}"
                )));
            }
        };

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::InvalidResponse(format!("{method}: missing result")))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, TelegramError> {
        let request = self
            .client
            .post(self.endpoint(method))
            .json(&body)
            .timeout(self.request_timeout);
        self.execute(method, request).await
    }

    /// Identify the bot; used at startup to verify the token
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", json!({})).await
    }

    /// Long-poll for new messages
    ///
    /// `offset` should be one past the last `update_id` processed, which also
    /// acknowledges earlier updates on the server.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut body = json!({
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        let request = self
            .client
            .post(self.endpoint("getUpdates"))
            .json(&body)
            .timeout(timeout + self.request_timeout);
        self.execute("getUpdates", request).await
    }
}

fn reply_parameters(reply_to: Option<MessageId>) -> Option<Value> {
    reply_to.map(|id| {
        json!({
            "message_id": id.0,
            "allow_sending_without_reply": true,
        })
    })
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> Result<MessageHandle, TelegramError> {
        let mut body = json!({
            "chat_id": chat.0,
            "text": text,
        });
        if let Some(params) = reply_parameters(reply_to) {
            body["reply_parameters"] = params;
        }
        let message: Message = self.call("sendMessage", body).await?;
        Ok(MessageHandle {
            chat: ChatId(message.chat.id),
            message_id: MessageId(message.message_id),
        })
    }

    async fn edit_text(&self, handle: MessageHandle, text: &str) -> Result<(), TelegramError> {
        // Result is the edited Message, or `true` for inline messages.
        let _: Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": handle.chat.0,
                    "message_id": handle.message_id.0,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, handle: MessageHandle) -> Result<(), TelegramError> {
        let _: Value = self
            .call(
                "deleteMessage",
                json!({
                    "chat_id": handle.chat.0,
                    "message_id": handle.message_id.0,
                }),
            )
            .await?;
        Ok(())
    }

    async fn send_video(
        &self,
        chat: ChatId,
        reply_to: Option<MessageId>,
        video: &Path,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let bytes = tokio::fs::read(video).await?;
        let file_name = video
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4")
            .to_string();
        tracing::debug!(chat = %chat, size = bytes.len(), "uploading video");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")?;
        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat.0.to_string())
            .text("caption", caption.to_string())
            .text("supports_streaming", "true")
            .part("video", part);
        if let Some(params) = reply_parameters(reply_to) {
            form = form.text("reply_parameters", params.to_string());
        }

        // No per-request timeout: uploads are bounded by the caller's upload_timeout.
        let request = self.client.post(self.endpoint("sendVideo")).multipart(form);
        let _: Message = self.execute("sendVideo", request).await?;
        Ok(())
    }
}
