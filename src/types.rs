//! Core types for tiktok-dl

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for one incoming request
///
/// Allocated from a monotonic counter, so two requests never share an id even
/// when they arrive within the same second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Allocate the next id
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Telegram chat identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram message identifier, unique within a chat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Address of a message the bot sent, used to edit or delete it later
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    /// Chat the message lives in
    pub chat: ChatId,
    /// Message id within that chat
    pub message_id: MessageId,
}

/// A text message delivered to the bot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Originating chat
    pub chat: ChatId,
    /// Id of the user's message (replies are threaded to it)
    pub message_id: MessageId,
    /// Raw text payload
    pub text: String,
}

/// One download request: the candidate URL plus where to reply
#[derive(Clone, Debug)]
pub struct Request {
    /// Process-unique id
    pub id: RequestId,
    /// Chat to reply in
    pub chat: ChatId,
    /// Message being answered
    pub reply_to: MessageId,
    /// Candidate URL, whitespace-trimmed
    pub url: String,
}

impl Request {
    /// Build a request from an incoming message
    pub fn from_message(message: &IncomingMessage) -> Self {
        Self {
            id: RequestId::next(),
            chat: message.chat,
            reply_to: message.message_id,
            url: message.text.trim().to_string(),
        }
    }
}

/// Terminal classification of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Video uploaded
    Delivered,
    /// Input rejected before any I/O
    InvalidUrl,
    /// The extraction engine failed or timed out
    FetchFailed,
    /// Artifact exceeded the size ceiling
    Oversized,
    /// Upload (or anything else after a valid artifact existed) failed
    DeliveryFailed,
}

impl Outcome {
    /// Whether the requester got their video
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Delivered)
    }

    /// Short lowercase label for logs
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Delivered => "delivered",
            Outcome::InvalidUrl => "invalid_url",
            Outcome::FetchFailed => "fetch_failed",
            Outcome::Oversized => "oversized",
            Outcome::DeliveryFailed => "delivery_failed",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Not started
    Idle,
    /// Checking the URL
    Validating,
    /// Running the extraction engine
    Fetching,
    /// Comparing artifact size to the ceiling
    SizeChecking,
    /// Uploading the video
    Delivering,
    /// Removing the artifact
    Cleanup,
    /// Finished
    Done,
}

/// Coarse fetch status reported to a [`ProgressObserver`](crate::fetcher::ProgressObserver)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FetchProgress {
    /// Transfer in progress
    Downloading {
        /// Percent complete (0.0 to 100.0), if the engine reported one
        percent: Option<f32>,
    },
    /// Transfer finished
    Finished,
}

/// Events emitted by the bot
///
/// Subscribe with [`Bot::subscribe`](crate::bot::Bot::subscribe) or by handing a
/// sender to the [`DeliveryCoordinator`](crate::coordinator::DeliveryCoordinator).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A message became a request
    RequestReceived {
        /// Request id
        id: RequestId,
        /// Originating chat
        chat: ChatId,
    },

    /// A request moved to a new stage
    StageChanged {
        /// Request id
        id: RequestId,
        /// The stage entered
        stage: Stage,
    },

    /// Progress reported by the extraction engine
    FetchProgress {
        /// Request id
        id: RequestId,
        /// Reported status
        progress: FetchProgress,
    },

    /// A request reached its terminal outcome (artifact already removed)
    RequestCompleted {
        /// Request id
        id: RequestId,
        /// Terminal outcome
        outcome: Outcome,
    },

    /// The dispatcher stopped
    Shutdown,
}
