//! Update dispatcher
//!
//! [`Bot`] long-polls Telegram for messages, answers `/start` and `/help`
//! directly, and hands every other text message to the
//! [`DeliveryCoordinator`] on its own task. Polling never waits for a request
//! to finish; a semaphore bounds how many pipelines run at once.

pub mod commands;

use crate::config::Config;
use crate::coordinator::DeliveryCoordinator;
use crate::error::{Result, TelegramError};
use crate::fetcher::VideoFetcher;
use crate::messaging::{Messenger, TelegramClient, Update};
use crate::types::{Event, IncomingMessage, Request};
use async_trait::async_trait;
use commands::Command;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, broadcast};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Delay before polling again after a failed `getUpdates`
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Source of incoming updates
///
/// Implemented by [`TelegramClient`]; tests substitute a scripted source.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Wait up to `timeout` for updates after `offset`
    async fn poll(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> std::result::Result<Vec<Update>, TelegramError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> std::result::Result<Vec<Update>, TelegramError> {
        self.get_updates(offset, timeout).await
    }
}

/// The running bot
pub struct Bot {
    updates: Arc<dyn UpdateSource>,
    messenger: Arc<dyn Messenger>,
    coordinator: Arc<DeliveryCoordinator>,
    limiter: Arc<Semaphore>,
    poll_timeout: Duration,
    shutdown_grace: Duration,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Bot {
    /// Create a bot backed by a Telegram client
    pub fn new(client: TelegramClient, fetcher: Arc<dyn VideoFetcher>, config: &Config) -> Self {
        let client = Arc::new(client);
        Self::with_parts(client.clone(), client, fetcher, config)
    }

    /// Create a bot from its individual seams
    pub fn with_parts(
        updates: Arc<dyn UpdateSource>,
        messenger: Arc<dyn Messenger>,
        fetcher: Arc<dyn VideoFetcher>,
        config: &Config,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let coordinator = DeliveryCoordinator::new(fetcher, messenger.clone(), &config.download)
            .with_events(event_tx.clone());

        Self {
            updates,
            messenger,
            coordinator: Arc::new(coordinator),
            limiter: Arc::new(Semaphore::new(config.download.max_concurrent_requests)),
            poll_timeout: config.telegram.poll_timeout,
            shutdown_grace: config.shutdown_grace,
            event_tx,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Subscribe to bot events
    ///
    /// Events are broadcast; slow subscribers may miss events if they lag.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Poll for updates until [`shutdown`](Self::shutdown) is called
    ///
    /// Polling errors are logged and retried; they never end the loop.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            fetcher = self.coordinator.fetcher_name(),
            "bot started, polling for updates"
        );
        let mut offset: Option<i64> = None;

        loop {
            let polled = tokio::select! {
                () = self.cancel.cancelled() => break,
                polled = self.updates.poll(offset, self.poll_timeout) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.dispatch(update);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed, retrying");
                    tokio::select! {
                        () = self.cancel.cancelled() => break,
                        () = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }

        tracing::info!("stopped polling");
        Ok(())
    }

    /// Route one update; request work is spawned, never awaited here
    fn dispatch(&self, update: Update) {
        let Some(message) = update.message.and_then(|m| m.into_incoming()) else {
            tracing::trace!(update_id = update.update_id, "ignoring update without text");
            return;
        };

        match Command::parse(&message.text) {
            Some(command) => self.answer_command(command, message),
            None => self.spawn_request(message),
        }
    }

    fn answer_command(&self, command: Command, message: IncomingMessage) {
        let Some(reply) = command.reply() else {
            tracing::debug!(chat = %message.chat, text = %message.text, "ignoring unknown command");
            return;
        };
        let messenger = self.messenger.clone();
        self.tracker.spawn(async move {
            if let Err(e) = messenger
                .send_text(message.chat, Some(message.message_id), reply)
                .await
            {
                tracing::warn!(chat = %message.chat, error = %e, "failed to answer command");
            }
        });
    }

    fn spawn_request(&self, message: IncomingMessage) {
        let request = Request::from_message(&message);
        self.event_tx
            .send(Event::RequestReceived {
                id: request.id,
                chat: request.chat,
            })
            .ok();

        let coordinator = self.coordinator.clone();
        let limiter = self.limiter.clone();
        self.tracker.spawn(async move {
            let _permit = match limiter.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(request_id = %request.id, error = %e, "concurrency limiter closed");
                    return;
                }
            };
            coordinator.handle(request).await;
        });
    }

    /// Stop polling and wait for in-flight requests
    ///
    /// Requests still running after the grace period are abandoned; those that
    /// finish in time have already removed their artifacts.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("initiating graceful shutdown");
        self.cancel.cancel();
        self.tracker.close();

        let in_flight = self.tracker.len();
        if in_flight > 0 {
            tracing::info!(in_flight, "waiting for in-flight requests");
        }
        match tokio::time::timeout(self.shutdown_grace, self.tracker.wait()).await {
            Ok(()) => tracing::info!("all requests finished"),
            Err(_) => tracing::warn!(
                remaining = self.tracker.len(),
                grace_secs = self.shutdown_grace.as_secs(),
                "grace period elapsed with requests still running"
            ),
        }

        self.event_tx.send(Event::Shutdown).ok();
        tracing::info!("shutdown complete");
        Ok(())
    }
}
