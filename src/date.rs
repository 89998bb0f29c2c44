//! Date normalizer: feed dates (mostly RFC 2822) into RFC 3339 strings.
//!
//! Never fails. Anything that does not parse comes back exactly as it went in, so
//! downstream ranking has to cope with a mix of canonical and raw strings.

use chrono::{DateTime, NaiveDateTime};

/// Normalize a feed date string.
///
/// - RFC 2822 (`Mon, 02 Jan 2006 15:04:05 +0000`) → `2006-01-02T15:04:05+00:00`
/// - RFC 3339 / ISO-8601 with offset → RFC 3339 with a numeric offset
/// - ISO-8601 without offset → `YYYY-MM-DDTHH:MM:SS`
/// - anything else, including `""` → unchanged
pub fn normalize_pubdate(raw: &str) -> String {
    try_normalize(raw).unwrap_or_else(|| raw.to_string())
}

fn try_normalize(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.to_rfc3339());
    }
    // Feeds get the weekday wrong often enough; the date itself is what matters.
    if let Some((_, rest)) = s.split_once(',') {
        if let Ok(dt) = DateTime::parse_from_rfc2822(rest.trim()) {
            return Some(dt.to_rfc3339());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_rfc3339());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }
    None
}
