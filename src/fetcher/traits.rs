//! Traits and types for video fetching

use crate::artifact::Artifact;
use crate::error::FetchError;
use crate::types::{Event, FetchProgress, RequestId};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::broadcast;

/// Everything a fetcher needs for one download
#[derive(Clone, Debug)]
pub struct FetchRequest {
    /// Request this fetch belongs to (for logging)
    pub id: RequestId,
    /// Normalized source URL
    pub url: String,
    /// Reserved output path; the artifact must land exactly here
    pub output: PathBuf,
    /// Preferred maximum size in bytes
    ///
    /// Advisory only: the engine may still produce a larger file, and the size
    /// guard re-checks the real artifact afterwards.
    pub size_hint: u64,
}

/// Receives coarse progress transitions from a fetcher
///
/// Purely observational. Implementations must not block; the fetcher calls
/// them inline while reading engine output.
pub trait ProgressObserver: Send + Sync {
    /// Called on every progress transition
    fn on_progress(&self, progress: FetchProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(FetchProgress) + Send + Sync,
{
    fn on_progress(&self, progress: FetchProgress) {
        self(progress)
    }
}

/// Observer that ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _progress: FetchProgress) {}
}

/// Observer used by the coordinator: logs progress and forwards it as [`Event`]s
///
/// Download percentages are throttled to 10% steps so a chatty engine does not
/// flood the log or the event channel.
pub struct ProgressReporter {
    id: RequestId,
    event_tx: Option<broadcast::Sender<Event>>,
    last_decile: AtomicI32,
}

impl ProgressReporter {
    /// Create a reporter for one request
    pub fn new(id: RequestId, event_tx: Option<broadcast::Sender<Event>>) -> Self {
        Self {
            id,
            event_tx,
            last_decile: AtomicI32::new(-1),
        }
    }

    fn forward(&self, progress: FetchProgress) {
        if let Some(tx) = &self.event_tx {
            tx.send(Event::FetchProgress {
                id: self.id,
                progress,
            })
            .ok();
        }
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_progress(&self, progress: FetchProgress) {
        match progress {
            FetchProgress::Downloading { percent: Some(p) } => {
                let decile = (p.clamp(0.0, 100.0) / 10.0).floor() as i32;
                if self.last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
                    tracing::debug!(request_id = %self.id, percent = p, "downloading");
                    self.forward(progress);
                }
            }
            FetchProgress::Downloading { percent: None } => {
                if self.last_decile.fetch_max(0, Ordering::Relaxed) < 0 {
                    tracing::debug!(request_id = %self.id, "downloading");
                    self.forward(progress);
                }
            }
            FetchProgress::Finished => {
                tracing::debug!(request_id = %self.id, "download completed");
                self.forward(progress);
            }
        }
    }
}

/// Trait for fetching a single video
///
/// Implementations can run an external binary, call a library, or provide
/// stub functionality for graceful degradation.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    /// Download `request.url` to `request.output`
    ///
    /// On success the returned artifact lives at `request.output`. On failure a
    /// partial file may remain at that path (or a yt-dlp side file next to it);
    /// the caller is responsible for removing it.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the engine cannot be started, exits
    /// unsuccessfully, or reports success without producing the file.
    async fn fetch(
        &self,
        request: &FetchRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<Artifact, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
