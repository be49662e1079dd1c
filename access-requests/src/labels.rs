//! Display strings for statuses and timestamps.

use crate::types::ItemStatus;
use chrono::{DateTime, Utc};

/// Shown in place of a missing timestamp
pub const EMPTY_TIMESTAMP: &str = "—";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Label for a status literal; unknown literals pass through unchanged
#[must_use]
pub fn status_label(raw: &str) -> &str {
    raw.parse::<ItemStatus>().map_or(raw, |status| status.label())
}

/// Render an optional timestamp for display
#[must_use]
pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| EMPTY_TIMESTAMP.to_string(), |at| at.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_testing::test_epoch;

    #[test]
    fn known_statuses_are_capitalized() {
        assert_eq!(status_label("pending"), "Pending");
        assert_eq!(status_label("cancelled"), "Cancelled");
        assert_eq!(status_label("withdrawn"), "Withdrawn");
    }

    #[test]
    fn unknown_status_passes_through() {
        assert_eq!(status_label("expired"), "expired");
        assert_eq!(status_label("Approved"), "Approved");
        assert_eq!(status_label(""), "");
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(None), "—");
        assert_eq!(format_timestamp(Some(test_epoch())), "2025-01-01 00:00:00 UTC");
    }
}
