//! HTTP cache control module
//!
//! Provides `ETag` generation from file metadata, HTTP date handling and the
//! conditional-GET (revalidation) test used by the file server.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Generate an `ETag` from file identity: inode, size and mtime in
/// milliseconds, joined with `-` and quoted.
///
/// Any change to the file content moves at least one of the three
/// components, so the value identifies a specific content version.
pub fn file_etag(ino: u64, size: u64, mtime: DateTime<Utc>) -> String {
    format!("\"{ino}-{size}-{}\"", mtime.timestamp_millis())
}

/// Format a timestamp as an RFC 7231 HTTP date (`Date`, `Last-Modified`)
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date header value (RFC 2822 / RFC 7231 preferred form)
///
/// Returns `None` for malformed values; callers treat those as if the
/// header were absent.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Convert a filesystem mtime to a UTC timestamp
pub fn mtime_utc(mtime: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(mtime)
}

/// Check if the client's `If-None-Match` value matches the computed `ETag`
///
/// Supports a single tag, a comma-separated candidate list and the `*`
/// wildcard.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .any(|e| e.trim() == etag || e.trim() == "*")
}

/// Conditional-GET test: should the response be a 304?
///
/// A revalidation hit requires at least one validator from the client AND
/// every supplied validator to pass:
/// - `If-None-Match`, when present, must equal the computed `ETag`
///   (a mismatched `ETag` vetoes the hit even if the time check passes);
/// - `If-Modified-Since`, when present and parseable, must be at or after
///   the file's mtime, compared at whole-second granularity since HTTP
///   dates carry no sub-second precision.
pub fn is_revalidation_hit(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    mtime: DateTime<Utc>,
) -> bool {
    // Unparseable dates count as absent
    let client_mtime = if_modified_since.and_then(parse_http_date);

    if if_none_match.is_none() && client_mtime.is_none() {
        return false;
    }

    let etag_ok = if_none_match.is_none_or(|client| etag_matches(client, etag));
    let mtime_ok = client_mtime.is_none_or(|client| client.timestamp() >= mtime.timestamp());

    etag_ok && mtime_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mtime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 45).unwrap()
    }

    #[test]
    fn test_file_etag_format() {
        let etag = file_etag(42, 1024, mtime());
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag, format!("\"42-1024-{}\"", mtime().timestamp_millis()));
    }

    #[test]
    fn test_http_date_round_trip() {
        let formatted = http_date(mtime());
        assert_eq!(formatted, "Fri, 10 May 2024 12:30:45 GMT");
        let parsed = parse_http_date(&formatted).expect("valid date");
        assert_eq!(parsed, mtime());
    }

    #[test]
    fn test_parse_http_date_malformed() {
        assert!(parse_http_date("yesterday").is_none());
        assert!(parse_http_date("").is_none());
    }

    #[test]
    fn test_no_validators_is_miss() {
        assert!(!is_revalidation_hit(None, None, "\"e\"", mtime()));
    }

    #[test]
    fn test_etag_match_is_hit() {
        let etag = file_etag(1, 2, mtime());
        assert!(is_revalidation_hit(Some(&etag), None, &etag, mtime()));
        assert!(is_revalidation_hit(Some("*"), None, &etag, mtime()));
        let list = format!("\"other\", {etag}");
        assert!(is_revalidation_hit(Some(&list), None, &etag, mtime()));
    }

    #[test]
    fn test_etag_mismatch_vetoes_fresh_time() {
        // A satisfied If-Modified-Since does not rescue a mismatched ETag
        let later = http_date(mtime() + chrono::Duration::days(1));
        assert!(!is_revalidation_hit(
            Some("\"stale\""),
            Some(&later),
            "\"current\"",
            mtime()
        ));
    }

    #[test]
    fn test_if_modified_since_only() {
        let same = http_date(mtime());
        assert!(is_revalidation_hit(None, Some(&same), "\"e\"", mtime()));

        let earlier = http_date(mtime() - chrono::Duration::hours(1));
        assert!(!is_revalidation_hit(None, Some(&earlier), "\"e\"", mtime()));
    }

    #[test]
    fn test_malformed_date_counts_as_absent() {
        // Malformed date alone: no usable validator, so no hit
        assert!(!is_revalidation_hit(None, Some("not a date"), "\"e\"", mtime()));
        // Malformed date plus matching ETag: the ETag decides
        assert!(is_revalidation_hit(
            Some("\"e\""),
            Some("not a date"),
            "\"e\"",
            mtime()
        ));
    }
}
