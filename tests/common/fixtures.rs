//! Stub fetchers and request builders

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tiktok_dl::artifact::Artifact;
use tiktok_dl::fetcher::{FetchRequest, ProgressObserver, VideoFetcher};
use tiktok_dl::types::{ChatId, FetchProgress, MessageId};
use tiktok_dl::{FetchError, Request, RequestId};

pub const MIB: u64 = 1024 * 1024;

/// Fetcher that writes `size` bytes starting with `VIDEO:<url>`
///
/// Every reserved output path is recorded so tests can compare them.
pub struct WritingFetcher {
    pub size: u64,
    pub delay: Duration,
    pub outputs: Mutex<Vec<PathBuf>>,
}

impl WritingFetcher {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            delay: Duration::ZERO,
            outputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.outputs.lock().unwrap().len()
    }
}

/// Content marker written at the start of every stub video
pub fn marker(url: &str) -> String {
    format!("VIDEO:{url}")
}

#[async_trait]
impl VideoFetcher for WritingFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<Artifact, FetchError> {
        self.outputs.lock().unwrap().push(request.output.clone());
        observer.on_progress(FetchProgress::Downloading { percent: Some(0.0) });
        tokio::time::sleep(self.delay).await;

        tokio::fs::write(&request.output, marker(&request.url)).await?;
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&request.output)
            .await?;
        file.set_len(self.size).await?;

        observer.on_progress(FetchProgress::Finished);
        Ok(Artifact::from_path(&request.output).await?)
    }

    fn name(&self) -> &'static str {
        "writing-stub"
    }
}

/// Fetcher that always fails like a yt-dlp extraction error
#[derive(Default)]
pub struct FailingFetcher;

#[async_trait]
impl VideoFetcher for FailingFetcher {
    async fn fetch(
        &self,
        _request: &FetchRequest,
        _observer: &dyn ProgressObserver,
    ) -> Result<Artifact, FetchError> {
        Err(FetchError::ExitStatus {
            code: Some(1),
            stderr: "ERROR: [TikTok] Unable to extract video data".into(),
        })
    }

    fn name(&self) -> &'static str {
        "failing-stub"
    }
}

/// A request from `chat` carrying `url`
pub fn request(chat: i64, url: &str) -> Request {
    Request {
        id: RequestId::next(),
        chat: ChatId(chat),
        reply_to: MessageId(1),
        url: url.to_string(),
    }
}
