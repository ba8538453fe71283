//! Text normalization, log formatting and file system helpers.

use chrono::{NaiveDate, NaiveDateTime};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Timestamp format found in article headers.
pub const ARTICLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalize article body text.
///
/// Leading and trailing whitespace is trimmed, then every newline and tab is
/// removed. Runs of spaces are left alone.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_body_text("\n a\tb \n"), "ab");
/// ```
pub fn normalize_body_text(raw: &str) -> String {
    raw.trim().replace(['\n', '\t'], "")
}

/// Reduce a `YYYY-MM-DD HH:MM:SS` timestamp to its calendar day.
///
/// Returns `None` when the input does not match that format.
pub fn reformat_timestamp(raw: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(raw.trim(), ARTICLE_TIMESTAMP_FORMAT)
        .ok()
        .map(|ts| ts.date())
}

/// Truncate a string for logging purposes.
///
/// Counts characters rather than bytes so Hangul text is never cut inside a
/// code point.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("가나다라", 2), "가나…(+2 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Make a user-supplied keyword safe to embed in a file name.
///
/// Only path separators are replaced; Hangul and spaces are kept.
pub fn file_component(s: &str) -> String {
    s.replace(['/', '\\'], "_")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    fs::write(&probe_path, b"").await?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}
