//! CLI-based fetcher using the external yt-dlp binary

use super::parser::{format_selector, parse_progress_line, stderr_tail};
use super::traits::{FetchRequest, ProgressObserver, VideoFetcher};
use crate::artifact::Artifact;
use crate::config::DEFAULT_USER_AGENT;
use crate::error::FetchError;
use crate::types::FetchProgress;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Fetcher that runs `yt-dlp` once per request
///
/// The child process is killed if the fetch future is dropped (for example
/// when the coordinator's timeout fires), so no orphaned download keeps
/// writing into the working directory.
///
/// # Examples
///
/// ```no_run
/// use tiktok_dl::fetcher::YtDlpFetcher;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let fetcher = YtDlpFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let fetcher = YtDlpFetcher::from_path().expect("yt-dlp not found in PATH");
/// ```
#[derive(Clone, Debug)]
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    user_agent: String,
}

impl YtDlpFetcher {
    /// Create a fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Returns `None` if the binary is not installed.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Override the User-Agent header sent to the source site
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Path of the binary this fetcher runs
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    /// Command-line arguments for one fetch
    pub fn build_args(&self, request: &FetchRequest) -> Vec<OsString> {
        vec![
            "--no-playlist".into(),
            "--format".into(),
            format_selector(request.size_hint).into(),
            "--add-header".into(),
            format!("User-Agent:{}", self.user_agent).into(),
            "--output".into(),
            request.output.clone().into_os_string(),
            "--quiet".into(),
            "--progress".into(),
            "--newline".into(),
            "--no-warnings".into(),
            "--no-color".into(),
            "--".into(),
            request.url.clone().into(),
        ]
    }
}

#[async_trait]
impl VideoFetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<Artifact, FetchError> {
        tracing::debug!(
            request_id = %request.id,
            binary = ?self.binary_path,
            output = ?request.output,
            "starting yt-dlp"
        );

        let mut child = Command::new(&self.binary_path)
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FetchError::Spawn {
                binary: self.binary_path.clone(),
                reason: e.to_string(),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain both pipes together so a full stderr buffer cannot stall the child.
        let progress = async {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(p) = parse_progress_line(&line) {
                        observer.on_progress(p);
                    }
                }
            }
        };
        let errors = async {
            let mut buf = String::new();
            if let Some(mut stderr) = stderr {
                stderr.read_to_string(&mut buf).await.ok();
            }
            buf
        };
        let ((), stderr_text) = tokio::join!(progress, errors);

        let status = child.wait().await?;
        if !status.success() {
            let stderr = stderr_tail(&stderr_text);
            tracing::warn!(
                request_id = %request.id,
                code = ?status.code(),
                stderr = %stderr,
                "yt-dlp failed"
            );
            return Err(FetchError::ExitStatus {
                code: status.code(),
                stderr,
            });
        }

        let artifact = match Artifact::from_path(&request.output).await {
            Ok(artifact) => artifact,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NoOutput {
                    path: request.output.clone(),
                });
            }
            Err(e) => return Err(FetchError::Io(e)),
        };

        observer.on_progress(FetchProgress::Finished);
        tracing::info!(
            request_id = %request.id,
            size = artifact.size,
            "yt-dlp finished"
        );
        Ok(artifact)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
