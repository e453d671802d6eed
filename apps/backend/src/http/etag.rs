//! ETag helpers for room snapshots.
//!
//! The tag is derived from the room's `lock_version`, which bumps on every
//! mutation, so clients can poll cheaply with `If-None-Match`.

/// Format: `"room-{code}-v{version}"` (quoted, as HTTP requires).
pub fn room_etag(code: &str, version: i32) -> String {
    format!(r#""room-{code}-v{version}""#)
}

/// Weak comparison against an `If-None-Match` header value.
///
/// Accepts `*`, comma-separated lists and `W/` prefixes.
pub fn if_none_match_hits(header: &str, etag: &str) -> bool {
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}
