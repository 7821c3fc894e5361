//! Calendar-date parsing for loosely formatted input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a calendar date from `YYYY-MM-DD`, an RFC 3339 timestamp, or a
/// naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp.
///
/// Timestamps carrying an offset are converted to UTC before the time of day
/// is dropped.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|stamp| stamp.date())
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
