//! Video fetching through an external extraction engine
//!
//! The core abstraction is the [`VideoFetcher`] trait: given a source URL and a
//! reserved output path, produce an [`Artifact`](crate::artifact::Artifact) or a
//! [`FetchError`](crate::error::FetchError). Two implementations are provided:
//!
//! - [`YtDlpFetcher`]: runs the external `yt-dlp` binary
//! - [`NoOpFetcher`]: stub used when no binary is available; every fetch fails
//!
//! Progress is reported to a [`ProgressObserver`]. Observers are purely
//! observational and cannot change the fetch result.
//!
//! ## Usage
//!
//! ```no_run
//! use tiktok_dl::fetcher::{FetchRequest, NoopObserver, VideoFetcher, YtDlpFetcher};
//! use tiktok_dl::types::RequestId;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = YtDlpFetcher::from_path().expect("yt-dlp binary not found");
//!     let request = FetchRequest {
//!         id: RequestId::next(),
//!         url: "https://vm.tiktok.com/ABC123/".to_string(),
//!         output: PathBuf::from("tiktok_videos/video.mp4"),
//!         size_hint: 50 * 1024 * 1024,
//!     };
//!     let artifact = fetcher.fetch(&request, &NoopObserver).await?;
//!     println!("{} bytes at {}", artifact.size, artifact.path.display());
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod parser;
mod traits;

pub use cli::YtDlpFetcher;
pub use noop::NoOpFetcher;
pub use parser::{format_selector, parse_progress_line, stderr_tail};
pub use traits::{FetchRequest, NoopObserver, ProgressObserver, ProgressReporter, VideoFetcher};

use crate::config::{DownloadConfig, ToolsConfig};
use std::sync::Arc;

/// Pick the fetcher implementation for the configured tools
///
/// An explicit `ytdlp_path` wins; otherwise PATH is searched when allowed.
/// Without a binary the [`NoOpFetcher`] is returned, so the bot still starts and
/// answers every link with a failure reply.
pub fn select_fetcher(tools: &ToolsConfig, download: &DownloadConfig) -> Arc<dyn VideoFetcher> {
    let found = if let Some(ref path) = tools.ytdlp_path {
        Some(YtDlpFetcher::new(path.clone()))
    } else if tools.search_path {
        YtDlpFetcher::from_path()
    } else {
        None
    };

    match found {
        Some(fetcher) => {
            tracing::info!(binary = ?fetcher.binary_path(), "using yt-dlp");
            Arc::new(fetcher.with_user_agent(download.user_agent.clone()))
        }
        None => {
            tracing::warn!("yt-dlp not available, downloads will fail until it is installed");
            Arc::new(NoOpFetcher)
        }
    }
}
