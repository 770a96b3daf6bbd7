//! Time formatting helpers.

use agora_types::Timestamp;
use chrono::DateTime;

/// Render a proposal creation time as a UTC calendar date.
///
/// `Unknown` when the timestamp is 0 (no metadata) or out of chrono's range.
pub fn format_created_at(created_at: Timestamp) -> String {
    if created_at.is_unknown() {
        return "Unknown".to_string();
    }
    i64::try_from(created_at.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
