//! Minute-of-day arithmetic for the calendar grid.
//!
//! All positions on the day view are integer minutes since midnight. Values are
//! `i64` so that raw pointer positions above or below the grid and negative
//! durations survive the arithmetic and can be rejected by the caller.

use crate::error::{Result, SlotError};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Grid granularity of the calendar.
pub const QUARTER_HOUR_MINUTES: i64 = 15;

/// Length of the day view.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// 17:00. `move-next` looks for rescue slots that end by this minute.
pub const DAY_END_THRESHOLD: i64 = 17 * 60;

/// Round to the nearest quarter hour, halves rounding up (7 → 0, 8 → 15).
pub fn snap_to_quarter_hour(minutes: i64) -> i64 {
    snap_to(minutes, QUARTER_HOUR_MINUTES)
}

/// Round to the nearest multiple of `granularity`, halves rounding up.
///
/// A non-positive granularity leaves the value unchanged. Results saturate at
/// the ends of the `i64` range instead of overflowing.
pub fn snap_to(minutes: i64, granularity: i64) -> i64 {
    if granularity <= 0 {
        return minutes;
    }
    let remainder = minutes.rem_euclid(granularity);
    let floor = minutes.saturating_sub(remainder);
    if remainder >= granularity - granularity / 2 {
        floor.saturating_add(granularity)
    } else {
        floor
    }
}

/// Minutes since midnight of the first `HH:MM` in `time_str`.
///
/// Works on bare times (`"09:30"`, `"09:30:15"`) and on timestamps
/// (`"2026-02-20T09:30:00"`). Seconds are ignored. Input without an `HH:MM`
/// component, or one too large to count in minutes, yields 0, which cannot be
/// told apart from midnight; use [`parse_time_to_minutes`] where the
/// difference matters.
pub fn time_to_minutes(time_str: &str) -> i64 {
    find_hh_mm(time_str)
        .and_then(|(hours, minutes)| hours.checked_mul(60)?.checked_add(minutes))
        .unwrap_or(0)
}

/// Strict form of [`time_to_minutes`].
///
/// # Errors
/// Returns `SlotError::InvalidTime` when there is no `HH:MM` component, or when
/// the hour is not below 24 or the minute not below 60.
pub fn parse_time_to_minutes(time_str: &str) -> Result<i64> {
    match find_hh_mm(time_str) {
        Some((hours, minutes)) if hours < 24 && minutes < 60 => Ok(hours * 60 + minutes),
        _ => Err(SlotError::InvalidTime(time_str.to_string())),
    }
}

/// Format minutes since midnight as `HH:MM:00`.
///
/// The hour does not wrap: 1500 formats as `"25:00:00"`.
pub fn minutes_to_time(minutes: i64) -> String {
    let hours = minutes.div_euclid(60);
    let mins = minutes.rem_euclid(60);
    format!("{:02}:{:02}:00", hours, mins)
}

/// `time_to_minutes(end) - time_to_minutes(start)`. May be negative.
pub fn duration_minutes(start: &str, end: &str) -> i64 {
    time_to_minutes(end) - time_to_minutes(start)
}

/// Minutes since midnight of a timestamp's own day.
pub fn minute_of_day(dt: NaiveDateTime) -> i64 {
    i64::from(dt.hour()) * 60 + i64::from(dt.minute())
}

/// Minutes from midnight of `date` to `dt`. Negative before `date`, above 1440
/// after it.
pub fn minutes_since(date: NaiveDate, dt: NaiveDateTime) -> i64 {
    (dt - date.and_time(NaiveTime::MIN)).num_minutes()
}

/// The timestamp `minutes` after midnight of `date`.
pub fn at_minutes(date: NaiveDate, minutes: i64) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(minutes)
}

/// Leftmost `digits:digits` match, parsed as (hours, minutes).
fn find_hh_mm(s: &str) -> Option<(i64, i64)> {
    let bytes = s.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b':' {
            continue;
        }
        let before = bytes[..i]
            .iter()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let after = bytes[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if before == 0 || after == 0 {
            continue;
        }
        let hours = s[i - before..i].parse().ok()?;
        let minutes = s[i + 1..i + 1 + after].parse().ok()?;
        return Some((hours, minutes));
    }
    None
}
