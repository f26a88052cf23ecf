//! Parsers and builders for yt-dlp command lines and output

use crate::types::FetchProgress;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static PROGRESS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[download\]\s+(\d{1,3}(?:\.\d+)?)%").unwrap());

/// Maximum characters of stderr kept for diagnostics
const STDERR_TAIL_CHARS: usize = 500;

/// Parse one stdout line printed with `--newline --progress`
///
/// Lines look like `[download]  42.3% of ~ 3.21MiB at 1.02MiB/s ETA 00:02`.
/// Returns `None` for anything that is not a progress line.
pub fn parse_progress_line(line: &str) -> Option<FetchProgress> {
    let caps = PROGRESS_LINE.captures(line.trim())?;
    let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
    Some(FetchProgress::Downloading {
        percent: Some(percent.min(100.0)),
    })
}

/// Format expression preferring a single stream under `max_bytes`
///
/// Streams with unknown size are allowed (`<?`), and plain `best` is the
/// fallback; the size guard re-checks whatever gets downloaded.
pub fn format_selector(max_bytes: u64) -> String {
    format!("best[filesize<?{max_bytes}]/best")
}

/// Last meaningful part of yt-dlp's stderr, for error messages
///
/// Prefers `ERROR:` lines; otherwise keeps the final non-empty lines. The
/// result is capped at a few hundred characters.
pub fn stderr_tail(stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    let text = if errors.is_empty() {
        let lines: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(3);
        lines[start..].join(" | ")
    } else {
        errors.join(" | ")
    };

    let char_count = text.chars().count();
    if char_count > STDERR_TAIL_CHARS {
        text.chars().skip(char_count - STDERR_TAIL_CHARS).collect()
    } else {
        text
    }
}
