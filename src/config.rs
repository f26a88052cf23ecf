//! Configuration types for tiktok-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf, time::Duration};

/// Default size ceiling: 50 MiB, the Bot API upload limit for bots
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Browser-like User-Agent handed to yt-dlp
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Telegram Bot API settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by @BotFather (env: `BOT_TOKEN`)
    #[serde(default)]
    pub bot_token: String,

    /// Bot API base URL (default: "https://api.telegram.org")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-polling timeout for `getUpdates` (default: 30 seconds)
    #[serde(default = "default_poll_timeout", with = "duration_serde")]
    pub poll_timeout: Duration,

    /// Timeout for ordinary Bot API calls (default: 30 seconds)
    ///
    /// Video uploads use [`DownloadConfig::upload_timeout`] instead.
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_api_url(),
            poll_timeout: default_poll_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field(
                "bot_token",
                &if self.bot_token.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Download pipeline settings (working directory, size ceiling, timeouts)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory for transient artifacts, created if absent (default: "tiktok_videos")
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Maximum artifact size in bytes (default: 50 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Upper bound for a single yt-dlp run (default: 300 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub fetch_timeout: Duration,

    /// Upper bound for a single video upload (default: 120 seconds)
    #[serde(default = "default_upload_timeout", with = "duration_serde")]
    pub upload_timeout: Duration,

    /// Maximum pipelines running at once (default: 8)
    ///
    /// Requests over the limit wait inside their own task; the dispatcher keeps polling.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// User-Agent header sent by the extraction engine
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            max_file_size: default_max_file_size(),
            fetch_timeout: default_fetch_timeout(),
            upload_timeout: default_upload_timeout(),
            max_concurrent_requests: default_max_concurrent(),
            user_agent: default_user_agent(),
        }
    }
}

/// External tool configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for the bot
///
/// Sub-configs are flattened, so the JSON file format has no nesting:
///
/// ```json
/// { "bot_token": "123:abc", "working_dir": "/var/tmp/tiktok", "fetch_timeout": 120 }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Telegram Bot API settings
    #[serde(flatten)]
    pub telegram: TelegramConfig,

    /// Download pipeline settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// How long shutdown waits for in-flight requests (default: 60 seconds)
    #[serde(default = "default_shutdown_grace", with = "duration_serde")]
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            download: DownloadConfig::default(),
            tools: ToolsConfig::default(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

/// Environment variables recognised by [`Config::apply_env`]
pub mod env {
    /// Telegram bot token
    pub const BOT_TOKEN: &str = "BOT_TOKEN";
    /// Bot API base URL
    pub const API_URL: &str = "TELEGRAM_API_URL";
    /// Artifact working directory
    pub const WORKING_DIR: &str = "TIKTOK_DL_WORKING_DIR";
    /// Size ceiling in bytes
    pub const MAX_FILE_SIZE: &str = "TIKTOK_DL_MAX_FILE_SIZE";
    /// Fetch timeout in seconds
    pub const FETCH_TIMEOUT: &str = "TIKTOK_DL_FETCH_TIMEOUT";
    /// Upload timeout in seconds
    pub const UPLOAD_TIMEOUT: &str = "TIKTOK_DL_UPLOAD_TIMEOUT";
    /// Concurrency cap
    pub const MAX_CONCURRENT: &str = "TIKTOK_DL_MAX_CONCURRENT";
    /// Explicit yt-dlp path
    pub const YTDLP_PATH: &str = "TIKTOK_DL_YTDLP_PATH";
}

impl Config {
    /// Load a JSON config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Overlay settings from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay settings from an arbitrary variable lookup
    ///
    /// Unset or empty variables leave the current value untouched.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(env::BOT_TOKEN) {
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(url) = get(env::API_URL) {
            self.telegram.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(dir) = get(env::WORKING_DIR) {
            self.download.working_dir = PathBuf::from(dir);
        }
        if let Some(size) = get(env::MAX_FILE_SIZE) {
            self.download.max_file_size = parse_number(env::MAX_FILE_SIZE, &size)?;
        }
        if let Some(secs) = get(env::FETCH_TIMEOUT) {
            self.download.fetch_timeout =
                Duration::from_secs(parse_number(env::FETCH_TIMEOUT, &secs)?);
        }
        if let Some(secs) = get(env::UPLOAD_TIMEOUT) {
            self.download.upload_timeout =
                Duration::from_secs(parse_number(env::UPLOAD_TIMEOUT, &secs)?);
        }
        if let Some(n) = get(env::MAX_CONCURRENT) {
            self.download.max_concurrent_requests =
                parse_number::<usize>(env::MAX_CONCURRENT, &n)?;
        }
        if let Some(path) = get(env::YTDLP_PATH) {
            self.tools.ytdlp_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(Error::config(
                "bot_token",
                format!("bot token is required (set {})", env::BOT_TOKEN),
            ));
        }
        if url::Url::parse(&self.telegram.api_url).is_err() {
            return Err(Error::config(
                "api_url",
                format!("not a valid URL: {}", self.telegram.api_url),
            ));
        }
        if self.download.max_file_size == 0 {
            return Err(Error::config("max_file_size", "must be greater than zero"));
        }
        if self.download.fetch_timeout.is_zero() {
            return Err(Error::config("fetch_timeout", "must be greater than zero"));
        }
        if self.download.upload_timeout.is_zero() {
            return Err(Error::config("upload_timeout", "must be greater than zero"));
        }
        if self.download.max_concurrent_requests == 0 {
            return Err(Error::config(
                "max_concurrent_requests",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Working directory for transient artifacts
    pub fn working_dir(&self) -> &PathBuf {
        &self.download.working_dir
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::config(key, format!("expected a non-negative integer, got {raw:?}")))
}

// Default value functions
fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_working_dir() -> PathBuf {
    PathBuf::from("tiktok_videos")
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_upload_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_max_concurrent() -> usize {
    8
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(60)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
