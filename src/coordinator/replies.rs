//! User-visible reply texts

/// Reply to a message that is not a TikTok link
pub const INVALID_URL: &str = "❌ Invalid TikTok URL. Please send a valid link.";

/// Placeholder sent while the video downloads
pub const DOWNLOADING: &str = "⏳ Downloading your TikTok video...";

/// Placeholder replacement when the extraction engine fails or times out
pub const FETCH_FAILED: &str = "❌ Failed to download video. Please try again later.";

/// Caption attached to a delivered video
pub const DELIVERED_CAPTION: &str = "✅ Here's your TikTok video!";

/// Longest diagnostic shown to users, in characters
pub const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// Placeholder replacement for an artifact over the ceiling
pub fn oversized(limit_label: &str) -> String {
    format!("❌ Video is too large for Telegram (max {limit_label})")
}

/// Generic failure reply with a short diagnostic
pub fn error(diagnostic: &str) -> String {
    let short: String = diagnostic.chars().take(MAX_DIAGNOSTIC_CHARS).collect();
    format!("❌ Error: {short}")
}
