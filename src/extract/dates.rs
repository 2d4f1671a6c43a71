use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use super::Value;

const DATE_OUTPUT: &str = "%Y-%m-%d";

// Year-first formats must come before day-first ones so ISO-style inputs
// never get read as day/month/year.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Normalize an event-date cell to `YYYY-MM-DD`. Date cells drop their
/// time-of-day. Text cells get a best-effort parse over the known formats;
/// when none matches, the original text is embedded verbatim (the remote
/// side may still reject it, but an unparsed date never blocks the row).
pub fn normalize_event_date(value: &Value) -> String {
    match value {
        Value::Date(dt) => dt.date().format(DATE_OUTPUT).to_string(),
        Value::Text(s) => match parse_flexible(s.trim()) {
            Some(date) => date.format(DATE_OUTPUT).to_string(),
            None => {
                warn!(value = %s, "event date not parseable; embedding verbatim");
                s.clone()
            }
        },
        other => other.render_text(),
    }
}

fn parse_flexible(s: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    None
}
