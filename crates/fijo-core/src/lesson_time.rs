//! Lesson clock arithmetic.
//!
//! Lesson start times are stored as free-form clock strings entered by
//! schedulers, either 24-hour (`"14:00"`) or with a meridiem suffix
//! (`"10:00 AM"`, and in practice also `"14:00 PM"`). Durations are hours,
//! fractional allowed, optionally followed by a unit (`"1.5 hours"`).
//!
//! The end time is printed with a 24-hour hour field followed by the
//! meridiem (`"15:30 PM"`), which is the format existing certificates use.

use jiff::civil::{Date, Time};
use jiff::SignedDuration;

use crate::error::CoreError;

/// Start and end of a lesson as printed on a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    /// The start time as the scheduler entered it.
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse a lesson start time in `HH:mm` or `HH:mm AM/PM` form.
///
/// The meridiem only shifts hours that are still on the 12-hour clock:
/// `PM` adds twelve to hours below 12, `12 AM` is midnight, and an hour
/// already past noon (`"14:00 PM"`) is kept as is.
pub fn parse_start_time(input: &str) -> Result<Time, CoreError> {
    let invalid = || CoreError::InvalidTime(input.to_string());

    let (clock, meridiem) = split_meridiem(input.trim());
    let time = Time::strptime("%H:%M", clock).map_err(|_| invalid())?;

    let hour = match (meridiem, time.hour()) {
        (Some(Meridiem::Pm), h) if h < 12 => h + 12,
        (Some(Meridiem::Am), 12) => 0,
        (_, h) => h,
    };

    Time::new(hour, time.minute(), 0, 0).map_err(|_| invalid())
}

fn split_meridiem(input: &str) -> (&str, Option<Meridiem>) {
    if input.len() < 2 || !input.is_char_boundary(input.len() - 2) {
        return (input, None);
    }
    let (head, tail) = input.split_at(input.len() - 2);
    let meridiem = if tail.eq_ignore_ascii_case("am") {
        Meridiem::Am
    } else if tail.eq_ignore_ascii_case("pm") {
        Meridiem::Pm
    } else {
        return (input, None);
    };
    (head.trim_end(), Some(meridiem))
}

/// Parse a duration in hours from its leading number (`"2"`, `"1.5 hours"`).
pub fn parse_duration_hours(input: &str) -> Result<f64, CoreError> {
    let trimmed = input.trim();
    let numeric_len = trimmed
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map_or(trimmed.len(), |(i, _)| i);

    let hours: f64 = trimmed[..numeric_len]
        .parse()
        .map_err(|_| CoreError::InvalidDuration(input.to_string()))?;

    if !hours.is_finite() || hours < 0.0 {
        return Err(CoreError::InvalidDuration(input.to_string()));
    }
    Ok(hours)
}

/// Add `hours` to `start`, wrapping past midnight.
pub fn end_time(start: Time, hours: f64) -> Time {
    let seconds = (hours * 3600.0).round() as i64;
    start.wrapping_add(SignedDuration::from_secs(seconds))
}

/// `HH:mm AM|PM` with a 24-hour hour field.
pub fn format_meridiem(time: Time) -> String {
    time.strftime("%H:%M %p").to_string()
}

/// Resolve the printed time range for a lesson.
pub fn lesson_time_range(start: &str, duration: &str) -> Result<TimeRange, CoreError> {
    let start_time = parse_start_time(start)?;
    let hours = parse_duration_hours(duration)?;
    Ok(TimeRange {
        start: start.trim().to_string(),
        end: format_meridiem(end_time(start_time, hours)),
    })
}

/// ISO dates (`2025-02-20`) in German notation (`20.02.2025`). Anything
/// else is returned unchanged, trimmed.
pub fn format_german_date(input: &str) -> String {
    let trimmed = input.trim();
    match Date::strptime("%Y-%m-%d", trimmed) {
        Ok(date) => date.strftime("%d.%m.%Y").to_string(),
        Err(_) => trimmed.to_string(),
    }
}
