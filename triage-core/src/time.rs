//! Date utilities: coercing loosely-typed due dates and resolving "today".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Parse due-date text into a calendar date.
///
/// Accepts ISO dates (`2025-11-30`) and date-times, which are truncated to
/// their date (`2025-11-30T17:00:00`, `2025-11-30 17:00`, RFC 3339 with offset).
pub fn parse_due_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|ndt| ndt.date())
}

/// The calendar date "now" falls on in the given IANA timezone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse().ok()
}
