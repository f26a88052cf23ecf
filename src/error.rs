//! Error types for tiktok-dl
//!
//! This module provides the error handling for the library:
//! - [`Error`], the crate-level error returned by setup and I/O operations
//! - [`FetchError`], every way the extraction engine can fail to produce an artifact
//! - [`TelegramError`], failures talking to the Telegram Bot API
//!
//! Errors inside a single request pipeline never escape that request. The
//! coordinator classifies them into an [`Outcome`](crate::types::Outcome) and
//! turns them into exactly one user-visible reply.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for tiktok-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tiktok-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "bot_token")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The extraction engine failed to produce an artifact
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Telegram Bot API error
    #[error("telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// Artifact exceeds the configured size ceiling
    #[error("artifact is {size} bytes, limit is {limit} bytes")]
    Oversized {
        /// Actual artifact size in bytes
        size: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Extraction failures reported by a [`VideoFetcher`](crate::fetcher::VideoFetcher)
#[derive(Debug, Error)]
pub enum FetchError {
    /// The extraction binary could not be started
    #[error("failed to execute {binary}: {reason}")]
    Spawn {
        /// The binary that was executed
        binary: PathBuf,
        /// OS-level reason
        reason: String,
    },

    /// The extraction binary exited unsuccessfully
    #[error("yt-dlp exited with {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")))]
    ExitStatus {
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
        /// Tail of the engine's stderr
        stderr: String,
    },

    /// The engine reported success but the expected output file is missing
    #[error("no output produced at {path}")]
    NoOutput {
        /// The reserved output path
        path: PathBuf,
    },

    /// The fetch did not complete within the configured timeout
    #[error("fetch timed out after {}s", .after.as_secs())]
    Timeout {
        /// The configured timeout
        after: Duration,
    },

    /// No extraction engine is available
    #[error("not supported: {0}")]
    NotSupported(String),

    /// I/O error while inspecting the output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Telegram Bot API errors
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Telegram API returned `ok: false`
    #[error("Telegram API error {code}: {description}")]
    Api {
        /// `error_code` from the response envelope (or the HTTP status)
        code: i64,
        /// `description` from the response envelope
        description: String,
    },

    /// Reading a file for upload failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The response envelope had `ok: true` but no usable result
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
