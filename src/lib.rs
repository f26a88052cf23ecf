//! # tiktok-dl
//!
//! Telegram bot that downloads TikTok videos and sends them back to the chat.
//!
//! ## Pipeline
//!
//! Every text message becomes one request that runs on its own task:
//!
//! 1. [`UrlValidator`] rejects anything that is not a TikTok link
//! 2. a [`VideoFetcher`] (normally [`YtDlpFetcher`]) downloads the video into a
//!    uniquely named file in the working directory
//! 3. [`SizeGuard`] refuses files over Telegram's upload ceiling
//! 4. the [`DeliveryCoordinator`] uploads the video, keeps the user informed
//!    through a placeholder message, and removes the file on every path
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tiktok_dl::{Bot, Config, TelegramClient, YtDlpFetcher, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.apply_env()?;
//!     config.validate()?;
//!
//!     let client = TelegramClient::from_config(&config.telegram);
//!     let fetcher = YtDlpFetcher::from_path().ok_or("yt-dlp not found")?;
//!     let bot = Bot::new(client, Arc::new(fetcher), &config);
//!
//!     // Subscribe to events
//!     let mut events = bot.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     run_with_shutdown(bot).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Artifact paths and cleanup
pub mod artifact;
/// Update dispatcher and command handling
pub mod bot;
/// Configuration types
pub mod config;
/// Per-request delivery pipeline
pub mod coordinator;
/// Error types
pub mod error;
/// Video fetching via yt-dlp
pub mod fetcher;
/// Logging setup
pub mod logging;
/// Chat platform seam and Telegram client
pub mod messaging;
/// Artifact size ceiling
pub mod size_guard;
/// Core types and events
pub mod types;
/// TikTok URL validation
pub mod validator;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use bot::Bot;
pub use config::Config;
pub use coordinator::DeliveryCoordinator;
pub use error::{Error, FetchError, Result, TelegramError};
pub use fetcher::{NoOpFetcher, ProgressObserver, VideoFetcher, YtDlpFetcher};
pub use messaging::{Messenger, TelegramClient};
pub use size_guard::SizeGuard;
pub use types::{Event, Outcome, Request, RequestId, Stage};
pub use validator::UrlValidator;

/// Run the bot until a termination signal arrives, then shut it down.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// After the signal, polling stops and in-flight requests get the configured
/// grace period to finish and remove their artifacts.
pub async fn run_with_shutdown(bot: Bot) -> Result<()> {
    tokio::select! {
        result = bot.run() => result?,
        () = wait_for_signal() => {}
    }
    bot.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
