//! Helpers for URL resolution, string truncation and output directories.
//!
//! - Relative link and image resolution against a source origin
//! - Character-safe truncation (Sinhala text is multi-byte)
//! - File system validation for the snapshot writer

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Resolve an `href`/`src` value against `origin`.
///
/// - `http://` and `https://` URLs pass through unchanged
/// - `//host/path` takes the origin's scheme
/// - `/path` becomes `origin + path`
/// - anything else becomes `origin + "/" + path`
///
/// # Examples
///
/// ```ignore
/// assert_eq!(resolve_url("https://x.lk", "/a.jpg"), "https://x.lk/a.jpg");
/// assert_eq!(resolve_url("https://x.lk", "a.jpg"), "https://x.lk/a.jpg");
/// ```
pub fn resolve_url(origin: &str, path: &str) -> String {
    let path = path.trim();
    let origin = origin.trim_end_matches('/');
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if let Some(rest) = path.strip_prefix("//") {
        let scheme = origin.split("://").next().unwrap_or("https");
        format!("{scheme}://{rest}")
    } else if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Number of characters (not bytes) in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number of
/// dropped characters appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let len = char_len(s);
    if len <= max {
        s.to_string()
    } else {
        format!("{}…(+{} chars)", truncate_chars(s, max), len - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://sinhala.newsfirst.lk";

    #[test]
    fn test_resolve_absolute_passthrough() {
        let url = "https://cdn.example.com/img/a.jpg";
        assert_eq!(resolve_url(ORIGIN, url), url);
        assert_eq!(resolve_url(ORIGIN, "http://x.test/b"), "http://x.test/b");
    }

    #[test]
    fn test_resolve_rooted_path() {
        assert_eq!(
            resolve_url(ORIGIN, "/img/photo.jpg"),
            format!("{ORIGIN}/img/photo.jpg")
        );
    }

    #[test]
    fn test_resolve_bare_path() {
        assert_eq!(
            resolve_url(ORIGIN, "2024/10/12/story"),
            format!("{ORIGIN}/2024/10/12/story")
        );
    }

    #[test]
    fn test_resolve_trailing_slash_origin() {
        assert_eq!(
            resolve_url("https://x.lk/", "/a"),
            "https://x.lk/a"
        );
    }

    #[test]
    fn test_resolve_scheme_relative() {
        assert_eq!(
            resolve_url(ORIGIN, "//cdn.newsfirst.lk/a.jpg"),
            "https://cdn.newsfirst.lk/a.jpg"
        );
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let s = "ශ්‍රී ලංකා";
        let cut = truncate_chars(s, 3);
        assert_eq!(char_len(&cut), 3);
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
