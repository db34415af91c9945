use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use crate::error::AppError;

const WALL_CLOCK_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timezone(name: &str) -> Result<Tz, AppError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AppError::Validation(format!("Invalid timezone: {}", name)))
}

/// Resolves a local wall-clock time in `tz` to UTC.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap do not exist and are rejected.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Utc>, AppError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(AppError::Validation(format!(
            "Local time {} does not exist in {}",
            naive,
            tz.name()
        ))),
    }
}

/// Accepts RFC 3339 (offset honoured) or a naive `datetime-local` value
/// interpreted in `tz`.
pub fn parse_wall_clock(input: &str, tz: &Tz) -> Result<DateTime<Utc>, AppError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in WALL_CLOCK_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return localize(tz, naive);
        }
    }

    Err(AppError::Validation(format!("Invalid datetime format: {}", input)))
}

pub fn parse_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date format (YYYY-MM-DD): {}", input)))
}
