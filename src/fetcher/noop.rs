//! No-op fetcher for graceful degradation

use super::traits::{FetchRequest, ProgressObserver, VideoFetcher};
use crate::artifact::Artifact;
use crate::error::FetchError;
use async_trait::async_trait;

/// Fetcher used when no yt-dlp binary is available
///
/// Every fetch fails with [`FetchError::NotSupported`], so the bot keeps
/// answering (with a failure reply) instead of refusing to start.
///
/// # Examples
///
/// ```
/// use tiktok_dl::fetcher::{FetchRequest, NoOpFetcher, NoopObserver, VideoFetcher};
/// use tiktok_dl::types::RequestId;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() {
/// let request = FetchRequest {
///     id: RequestId::next(),
///     url: "https://vm.tiktok.com/ABC123".into(),
///     output: PathBuf::from("out.mp4"),
///     size_hint: 1024,
/// };
/// assert!(NoOpFetcher.fetch(&request, &NoopObserver).await.is_err());
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpFetcher;

#[async_trait]
impl VideoFetcher for NoOpFetcher {
    async fn fetch(
        &self,
        _request: &FetchRequest,
        _observer: &dyn ProgressObserver,
    ) -> Result<Artifact, FetchError> {
        Err(FetchError::NotSupported(
            "video download requires the external yt-dlp binary. \
             Configure ytdlp_path in config or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
