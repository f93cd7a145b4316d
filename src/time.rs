use std::ops::Range;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::error::{Result, TrenoError};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

const MS_PER_MINUTE: Millis = 60_000;

// Bare numbers outside this open interval are seconds, years or garbage.
const MIN_EPOCH_MS: f64 = 1e11;
const MAX_EPOCH_MS: f64 = 1e13;

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Turns any timestamp-like JSON value into a millisecond epoch.
///
/// Accepted shapes are plain numbers within the epoch sanity bounds, 13-digit
/// epoch strings, 12/14-digit `YYYYMMDDHHmm[ss]` strings in `tz` local time
/// and anything the general date parser understands. Everything else is `None`.
pub fn normalize(value: &Value, tz: Tz) -> Option<Millis> {
    match value {
        Value::Number(number) => from_number(number.as_f64()?),
        Value::String(text) => parse_str(text.trim(), tz),
        _ => None,
    }
}

pub fn from_number(number: f64) -> Option<Millis> {
    (number > MIN_EPOCH_MS && number < MAX_EPOCH_MS).then(|| number.round() as Millis)
}

pub fn parse_str(text: &str, tz: Tz) -> Option<Millis> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return match text.len() {
            13 => text.parse().ok(),
            12 | 14 => compact_local(text, tz),
            _ => None,
        };
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.timestamp_millis());
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .and_then(|naive| local_millis(&naive, tz))
}

fn compact_local(text: &str, tz: Tz) -> Option<Millis> {
    let field = |range: Range<usize>| -> Option<u32> { text.get(range)?.parse().ok() };

    let date = NaiveDate::from_ymd_opt(field(0..4)? as i32, field(4..6)?, field(6..8)?)?;
    let seconds = if text.len() == 14 { field(12..14)? } else { 0 };
    let naive = date.and_hms_opt(field(8..10)?, field(10..12)?, seconds)?;

    local_millis(&naive, tz)
}

fn local_millis(naive: &NaiveDateTime, tz: Tz) -> Option<Millis> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|datetime| datetime.timestamp_millis())
}

/// Local `HH:MM` of an epoch.
pub fn hhmm(millis: Millis, tz: Tz) -> Option<String> {
    let datetime = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(datetime.with_timezone(&tz).format("%H:%M").to_string())
}

pub fn same_minute(a: Millis, b: Millis, tz: Tz) -> bool {
    match (hhmm(a, tz), hhmm(b, tz)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// `None` when the product does not fit an epoch.
pub fn minutes_to_millis(minutes: i64) -> Option<Millis> {
    minutes.checked_mul(MS_PER_MINUTE)
}

/// Whole minutes from `from` to `to`, rounded up.
pub fn minutes_until(from: Millis, to: Millis) -> i64 {
    let diff = to - from;
    diff.div_euclid(MS_PER_MINUTE) + i64::from(diff.rem_euclid(MS_PER_MINUTE) != 0)
}

pub fn now() -> Millis {
    Utc::now().timestamp_millis()
}

/// Strict variant for user input, where an unparseable value is an error.
pub fn parse_arg(text: &str, tz: Tz) -> Result<Millis> {
    parse_str(text.trim(), tz).ok_or_else(|| TrenoError::Timestamp(text.to_owned()))
}
