use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;
use std::str::FromStr;
use crate::domain::services::time::localize;
use crate::error::AppError;

/// Inputs of a weekly recurring series, in the series' local wall clock.
#[derive(Debug, Clone)]
pub struct SeriesDefinition {
    pub first_start: NaiveDateTime,
    pub first_end: NaiveDateTime,
    pub weekdays: Vec<Weekday>,
    pub recurring_until: NaiveDate,
    pub timezone: Tz,
}

/// One generated occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSlot {
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Parses names like `"Mon"`, `"wednesday"`; duplicates collapse and the
/// result is ordered Monday first.
pub fn parse_weekdays(names: &[String]) -> Result<Vec<Weekday>, AppError> {
    let mut weekdays = Vec::with_capacity(names.len());
    for name in names {
        let day = Weekday::from_str(name.trim())
            .map_err(|_| AppError::Validation(format!("Invalid weekday: {}", name)))?;
        weekdays.push(day);
    }
    weekdays.sort_by_key(|d| d.num_days_from_monday());
    weekdays.dedup();
    Ok(weekdays)
}

/// Expands a series into its sessions, ordered by start time.
///
/// Every date from the first start's date through `recurring_until`
/// (inclusive) whose weekday is listed yields one session. Each session keeps
/// the local start time and local duration of the first occurrence, so the
/// UTC offset follows DST. Any violated constraint rejects the whole series.
pub fn expand(def: &SeriesDefinition, max_sessions: usize) -> Result<Vec<SessionSlot>, AppError> {
    if def.weekdays.is_empty() {
        return Err(AppError::Validation("Recurring events need at least one weekday".into()));
    }

    let duration: Duration = def.first_end - def.first_start;
    if duration <= Duration::zero() {
        return Err(AppError::Validation("Start time must be before end time".into()));
    }

    let mut mask = [false; 7];
    for day in &def.weekdays {
        mask[day.num_days_from_monday() as usize] = true;
    }

    let start_date = def.first_start.date();
    let time_of_day = def.first_start.time();

    let first_date = start_date
        .iter_days()
        .take(7)
        .find(|d| mask[d.weekday().num_days_from_monday() as usize]);

    match first_date {
        Some(first) if first <= def.recurring_until => {}
        _ => {
            return Err(AppError::Validation(
                "End date is before the first occurrence of the series".into(),
            ));
        }
    }

    let mut slots = Vec::new();
    for date in start_date.iter_days().take_while(|d| *d <= def.recurring_until) {
        if !mask[date.weekday().num_days_from_monday() as usize] {
            continue;
        }
        if slots.len() == max_sessions {
            return Err(AppError::Validation(format!(
                "Series would generate more than {} sessions",
                max_sessions
            )));
        }

        let local_start = date.and_time(time_of_day);
        let start_time = localize(&def.timezone, local_start)?;
        let end_time = localize(&def.timezone, local_start + duration)?;

        if end_time <= start_time {
            return Err(AppError::Validation(format!(
                "Session on {} has no duration in {}",
                date,
                def.timezone.name()
            )));
        }

        slots.push(SessionSlot { date, start_time, end_time });
    }

    Ok(slots)
}
