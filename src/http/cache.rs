//! HTTP cache control module
//!
//! Provides `ETag` generation and conditional request handling.

use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Cache-Control sent with uploaded tracks
pub const TRACK_CACHE_CONTROL: &str = "public, max-age=3600";

/// Generate an `ETag` from file size and modification time
///
/// Tracks are never rewritten in place, so size plus mtime identifies
/// the content without reading it.
///
/// # Returns
/// Quoted `ETag` string, e.g., `"1f4-18c2a7b3e10"`
pub fn etag_for(len: u64, modified_millis: u128) -> String {
    format!("\"{len:x}-{modified_millis:x}\"")
}

/// `ETag` for a file on disk, a missing mtime counts as the epoch
pub fn etag_from_metadata(metadata: &Metadata) -> String {
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis());
    etag_for(metadata.len(), modified)
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
///
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_format() {
        let etag = etag_for(500, 1_700_000_000_000);
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag, "\"1f4-18bcfe56800\"");
    }

    #[test]
    fn test_etag_changes_with_size_or_time() {
        assert_ne!(etag_for(10, 1), etag_for(11, 1));
        assert_ne!(etag_for(10, 1), etag_for(10, 2));
        assert_eq!(etag_for(10, 1), etag_for(10, 1));
    }

    #[test]
    fn test_etag_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1-2-a.mp3");
        std::fs::write(&path, b"abc").unwrap();
        let meta = std::fs::metadata(&path).unwrap();

        let etag = etag_from_metadata(&meta);
        assert!(etag.starts_with("\"3-"));
        assert_eq!(etag, etag_from_metadata(&meta));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }
}
