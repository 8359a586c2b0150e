//! Date helper functions

use chrono::{DateTime, TimeZone, Utc};

/// Shown wherever a date is expected but the post has none
pub const DATE_PLACEHOLDER: &str = "Not published";

/// Default display format, e.g. "January 15, 2024"
pub const DEFAULT_DATE_FORMAT: &str = "MMMM D, YYYY";

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format an optional timestamp, falling back to [`DATE_PLACEHOLDER`]
pub fn display_date(date: Option<&DateTime<Utc>>, format: &str) -> String {
    match date {
        Some(date) => format_date(date, format),
        None => DATE_PLACEHOLDER.to_string(),
    }
}

/// Format a date in ISO 8601 / XML format, for `<time datetime>` attributes
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each category
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("D", "%-d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
        ("SSS", "%3f"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
