//! TikTok URL validation
//!
//! Accepts the TikTok link family: optional `http`/`https` scheme, optional
//! `vm.`, `vt.` or `www.` subdomain, host `tiktok.com`, and any path after a `/`.
//! Everything else is rejected before the pipeline performs any I/O.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static TIKTOK_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?://)?(?:(?:vm|vt|www)\.)?tiktok\.com/").unwrap());

/// Pure predicate over candidate URLs
#[derive(Clone, Copy, Debug, Default)]
pub struct UrlValidator;

impl UrlValidator {
    /// Check whether `url` belongs to the supported link family
    ///
    /// Leading and trailing whitespace is not stripped here; callers trim
    /// message text before validating.
    ///
    /// ```
    /// use tiktok_dl::validator::UrlValidator;
    ///
    /// assert!(UrlValidator::is_valid("https://vm.tiktok.com/ABC123"));
    /// assert!(UrlValidator::is_valid("tiktok.com/@user/video/1"));
    /// assert!(!UrlValidator::is_valid("https://example.com/video"));
    /// ```
    pub fn is_valid(url: &str) -> bool {
        TIKTOK_URL.is_match(url)
    }

    /// Validate and turn `url` into the form handed to the extraction engine
    ///
    /// Trims whitespace and adds `https://` when no scheme is present. Returns
    /// `None` if the input is not a valid TikTok URL.
    pub fn normalize(url: &str) -> Option<String> {
        let url = url.trim();
        if !Self::is_valid(url) {
            return None;
        }
        let with_scheme = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        };
        url::Url::parse(&with_scheme).ok().map(String::from)
    }
}
