//! Weak entity tags derived from a record's last-modification instant

use chrono::{DateTime, Utc};

use crate::patient::Patient;

/// Render `instant` as a weak validator: `W/"<unix seconds>.<microseconds>"`.
///
/// Microsecond resolution matches what the database stores, so a token
/// computed before and after a round trip through the store is identical.
pub fn weak_etag(instant: DateTime<Utc>) -> String {
    format!(
        "W/\"{}.{:06}\"",
        instant.timestamp(),
        instant.timestamp_subsec_micros()
    )
}

/// Freshness token for the current version of `patient`
pub fn patient_etag(patient: &Patient) -> String {
    weak_etag(patient.last_modified())
}

/// True when the client's `If-None-Match` value is exactly `etag`
pub fn is_not_modified(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match == Some(etag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_seconds_and_micros() {
        let instant = Utc.timestamp_opt(1_700_000_000, 42_000).unwrap();
        assert_eq!(weak_etag(instant), "W/\"1700000000.000042\"");
    }

    #[test]
    fn distinct_instants_give_distinct_tags() {
        let a = Utc.timestamp_opt(1_700_000_000, 1_000).unwrap();
        let b = Utc.timestamp_opt(1_700_000_000, 2_000).unwrap();
        assert_ne!(weak_etag(a), weak_etag(b));
    }

    #[test]
    fn match_requires_exact_equality() {
        let tag = "W/\"1700000000.000000\"";
        assert!(is_not_modified(Some(tag), tag));
        assert!(!is_not_modified(None, tag));
        assert!(!is_not_modified(Some("\"1700000000.000000\""), tag));
        assert!(!is_not_modified(Some("*"), tag));
    }
}
