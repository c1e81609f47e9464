//! Local timestamp formatting.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Display format for every timestamp shown in the dashboard.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, formatted for display.
pub fn local_now() -> String {
    Local::now().format(DISPLAY_FORMAT).to_string()
}

/// Format a backend timestamp as local time.
///
/// Accepts RFC 3339 (`2025-03-01T12:00:00+00:00`) and naive ISO 8601
/// (`2025-03-01T12:00:00.123456`, read as UTC). Anything else is returned
/// unchanged so the raw value is still visible.
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Utc
                .from_utc_datetime(&naive)
                .with_timezone(&Local)
                .format(DISPLAY_FORMAT)
                .to_string();
        }
    }

    raw.to_string()
}
