//! Per-request delivery pipeline
//!
//! [`DeliveryCoordinator::handle`] drives one request through
//! `Validating → Fetching → SizeChecking → Delivering → Cleanup → Done`.
//! Any failure jumps straight to `Cleanup`. Whatever happens, the request
//! produces exactly one terminal reply and its artifact slot is removed before
//! [`Event::RequestCompleted`] is emitted.

pub mod replies;

use crate::artifact::{Artifact, ArtifactSlot};
use crate::config::DownloadConfig;
use crate::error::{Error, FetchError};
use crate::fetcher::{FetchRequest, ProgressReporter, VideoFetcher};
use crate::messaging::Messenger;
use crate::size_guard::SizeGuard;
use crate::types::{Event, MessageHandle, Outcome, Request, RequestId, Stage};
use crate::validator::UrlValidator;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::Instrument;

/// Why a request that got past validation did not deliver
#[derive(Debug)]
pub enum FailureKind {
    /// The extraction engine failed or timed out
    FetchFailed(FetchError),
    /// Artifact larger than the ceiling
    Oversized {
        /// Actual size in bytes
        size: u64,
        /// Ceiling in bytes
        limit: u64,
    },
    /// Upload failed or timed out
    DeliveryFailed(String),
    /// Anything else once an artifact existed (e.g. it became unreadable)
    UnknownFailure(String),
}

impl FailureKind {
    /// Terminal outcome for this failure
    pub fn outcome(&self) -> Outcome {
        match self {
            FailureKind::FetchFailed(_) => Outcome::FetchFailed,
            FailureKind::Oversized { .. } => Outcome::Oversized,
            FailureKind::DeliveryFailed(_) | FailureKind::UnknownFailure(_) => {
                Outcome::DeliveryFailed
            }
        }
    }

    /// Text the placeholder is replaced with
    pub fn reply(&self, guard: &SizeGuard) -> String {
        match self {
            FailureKind::FetchFailed(_) => replies::FETCH_FAILED.to_string(),
            FailureKind::Oversized { .. } => replies::oversized(&guard.ceiling_label()),
            FailureKind::DeliveryFailed(diag) | FailureKind::UnknownFailure(diag) => {
                replies::error(diag)
            }
        }
    }
}

/// Runs the download pipeline for individual requests
///
/// Shared by every request task; holds no per-request state.
pub struct DeliveryCoordinator {
    fetcher: Arc<dyn VideoFetcher>,
    messenger: Arc<dyn Messenger>,
    guard: SizeGuard,
    working_dir: PathBuf,
    fetch_timeout: Duration,
    upload_timeout: Duration,
    event_tx: Option<broadcast::Sender<Event>>,
}

impl DeliveryCoordinator {
    /// Create a coordinator from download settings
    pub fn new(
        fetcher: Arc<dyn VideoFetcher>,
        messenger: Arc<dyn Messenger>,
        config: &DownloadConfig,
    ) -> Self {
        Self {
            fetcher,
            messenger,
            guard: SizeGuard::new(config.max_file_size),
            working_dir: config.working_dir.clone(),
            fetch_timeout: config.fetch_timeout,
            upload_timeout: config.upload_timeout,
            event_tx: None,
        }
    }

    /// Emit stage and outcome events on `tx`
    pub fn with_events(mut self, tx: broadcast::Sender<Event>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Name of the fetcher in use
    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    /// Run one request to completion
    ///
    /// Never fails: every error is turned into a reply and an [`Outcome`].
    pub async fn handle(&self, request: Request) -> Outcome {
        let span = tracing::info_span!(
            "request",
            request_id = %request.id,
            chat_id = %request.chat
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: Request) -> Outcome {
        let id = request.id;
        tracing::info!(url = %request.url, "request received");

        // Validating
        self.stage(id, Stage::Validating);
        let Some(url) = UrlValidator::normalize(&request.url) else {
            tracing::info!("rejected invalid url");
            if let Err(e) = self
                .messenger
                .send_text(request.chat, Some(request.reply_to), replies::INVALID_URL)
                .await
            {
                tracing::warn!(error = %e, "failed to send invalid-url reply");
            }
            return self.finish(id, Outcome::InvalidUrl);
        };

        // Placeholder; without it there is nothing to edit and the chat is unreachable
        let placeholder = match self
            .messenger
            .send_text(request.chat, Some(request.reply_to), replies::DOWNLOADING)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(error = %e, "failed to send placeholder, abandoning request");
                return self.finish(id, Outcome::DeliveryFailed);
            }
        };

        let slot = ArtifactSlot::allocate(&self.working_dir, id);
        let result = self.fetch_and_deliver(&request, url, &slot).await;

        match &result {
            Ok(()) => self.retire_placeholder(placeholder).await,
            Err(failure) => {
                tracing::warn!(?failure, "request failed");
                self.edit_placeholder(placeholder, &failure.reply(&self.guard))
                    .await;
            }
        }

        self.stage(id, Stage::Cleanup);
        let removed = slot.cleanup(id).await;
        tracing::debug!(removed, "artifact cleanup finished");

        let outcome = match result {
            Ok(()) => Outcome::Delivered,
            Err(failure) => failure.outcome(),
        };
        self.finish(id, outcome)
    }

    /// Fetching, SizeChecking and Delivering
    async fn fetch_and_deliver(
        &self,
        request: &Request,
        url: String,
        slot: &ArtifactSlot,
    ) -> Result<(), FailureKind> {
        let id = request.id;

        self.stage(id, Stage::Fetching);
        let artifact = self.fetch(id, url, slot).await?;

        self.stage(id, Stage::SizeChecking);
        let size = match self.guard.check(&artifact).await {
            Ok(size) => size,
            Err(Error::Oversized { size, limit }) => {
                tracing::info!(size, limit, "artifact over size ceiling");
                return Err(FailureKind::Oversized { size, limit });
            }
            Err(e) => return Err(FailureKind::UnknownFailure(e.to_string())),
        };

        self.stage(id, Stage::Delivering);
        let upload = self.messenger.send_video(
            request.chat,
            Some(request.reply_to),
            &artifact.path,
            replies::DELIVERED_CAPTION,
        );
        match tokio::time::timeout(self.upload_timeout, upload).await {
            Ok(Ok(())) => {
                tracing::info!(size, "video delivered");
                Ok(())
            }
            Ok(Err(e)) => Err(FailureKind::DeliveryFailed(e.to_string())),
            Err(_) => Err(FailureKind::DeliveryFailed(format!(
                "upload timed out after {}s",
                self.upload_timeout.as_secs()
            ))),
        }
    }

    async fn fetch(
        &self,
        id: RequestId,
        url: String,
        slot: &ArtifactSlot,
    ) -> Result<Artifact, FailureKind> {
        let fetch_request = FetchRequest {
            id,
            url,
            output: slot.path().to_path_buf(),
            size_hint: self.guard.ceiling(),
        };
        let reporter = ProgressReporter::new(id, self.event_tx.clone());

        tracing::debug!(fetcher = self.fetcher.name(), output = ?fetch_request.output, "fetching");
        let fetched = tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(&fetch_request, &reporter),
        )
        .await
        .unwrap_or(Err(FetchError::Timeout {
            after: self.fetch_timeout,
        }));

        fetched.map_err(|e| {
            tracing::warn!(error = %e, "fetch failed");
            FailureKind::FetchFailed(e)
        })
    }

    async fn edit_placeholder(&self, placeholder: MessageHandle, text: &str) {
        if let Err(e) = self.messenger.edit_text(placeholder, text).await {
            tracing::warn!(error = %e, "failed to edit placeholder");
        }
    }

    async fn retire_placeholder(&self, placeholder: MessageHandle) {
        if let Err(e) = self.messenger.delete_message(placeholder).await {
            tracing::warn!(error = %e, "failed to delete placeholder");
        }
    }

    fn stage(&self, id: RequestId, stage: Stage) {
        tracing::trace!(?stage, "stage");
        self.emit(Event::StageChanged { id, stage });
    }

    fn finish(&self, id: RequestId, outcome: Outcome) -> Outcome {
        self.stage(id, Stage::Done);
        tracing::info!(%outcome, "request completed");
        self.emit(Event::RequestCompleted { id, outcome });
        outcome
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.event_tx {
            tx.send(event).ok();
        }
    }
}
