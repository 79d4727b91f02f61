//! Drop zones: the free intervals of a provider's day.
//!
//! Busy intervals are clipped to the day, sorted, and merged before gaps are
//! taken, so the zones are disjoint and exactly complement the busy time even
//! when the store already holds double-booked appointments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, Provider, Schedule};
use crate::time::MINUTES_PER_DAY;

/// A free interval on one provider's column, in minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropZone {
    pub provider_id: String,
    pub start_minutes: i64,
    pub end_minutes: i64,
    pub is_valid: bool,
}

impl DropZone {
    pub fn duration_minutes(&self) -> i64 {
        self.end_minutes - self.start_minutes
    }

    /// Whether `[start, end)` lies entirely inside this zone.
    pub fn contains_range(&self, start: i64, end: i64) -> bool {
        self.is_valid && start >= self.start_minutes && end <= self.end_minutes && start < end
    }
}

/// One column of the availability overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAvailability {
    pub provider: Provider,
    pub zones: Vec<DropZone>,
}

/// A gap between busy intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeInterval {
    pub start: i64,
    pub end: i64,
    pub duration_minutes: i64,
}

/// Merge overlapping or adjacent busy intervals, clipped to the window.
///
/// Returns a sorted, non-overlapping list of (start, end) intervals.
fn merge_busy_periods(busy: &[(i64, i64)], window_start: i64, window_end: i64) -> Vec<(i64, i64)> {
    let mut intervals: Vec<(i64, i64)> = busy
        .iter()
        .filter(|&&(start, end)| start < end && start < window_end && end > window_start)
        .map(|&(start, end)| (start.max(window_start), end.min(window_end)))
        .collect();

    intervals.sort_unstable();

    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Gaps between `busy` intervals inside `[window_start, window_end)`, sorted by
/// start. Never returns an empty gap.
pub fn free_intervals(busy: &[(i64, i64)], window_start: i64, window_end: i64) -> Vec<FreeInterval> {
    let merged = merge_busy_periods(busy, window_start, window_end);

    let mut free = Vec::with_capacity(merged.len() + 1);
    let mut cursor = window_start;

    for &(busy_start, busy_end) in &merged {
        if cursor < busy_start {
            free.push(FreeInterval {
                start: cursor,
                end: busy_start,
                duration_minutes: busy_start - cursor,
            });
        }
        cursor = cursor.max(busy_end);
    }

    if cursor < window_end {
        free.push(FreeInterval {
            start: cursor,
            end: window_end,
            duration_minutes: window_end - cursor,
        });
    }

    free
}

/// First gap of at least `min_duration` minutes inside the window.
pub fn first_fit(
    busy: &[(i64, i64)],
    window_start: i64,
    window_end: i64,
    min_duration: i64,
) -> Option<FreeInterval> {
    free_intervals(busy, window_start, window_end)
        .into_iter()
        .find(|gap| gap.duration_minutes >= min_duration)
}

/// Drop zones for one provider on `date`.
///
/// With no appointments the whole day `[0, 1440)` is one zone.
pub fn compute_drop_zones(
    appointments: &[Appointment],
    provider_id: &str,
    date: NaiveDate,
) -> Vec<DropZone> {
    compute_drop_zones_excluding(appointments, provider_id, date, None)
}

/// Drop zones for one provider on `date`, ignoring the appointment `exclude_id`.
///
/// This is the view used while an appointment is being dragged: it must not
/// block its own move.
pub fn compute_drop_zones_excluding(
    appointments: &[Appointment],
    provider_id: &str,
    date: NaiveDate,
    exclude_id: Option<&str>,
) -> Vec<DropZone> {
    let busy = busy_intervals(appointments, provider_id, date, exclude_id);

    free_intervals(&busy, 0, MINUTES_PER_DAY)
        .into_iter()
        .map(|gap| DropZone {
            provider_id: provider_id.to_string(),
            start_minutes: gap.start,
            end_minutes: gap.end,
            is_valid: true,
        })
        .collect()
}

/// Drop zones for every provider in the roster, ordered by display name.
pub fn compute_all_drop_zones(schedule: &Schedule, date: NaiveDate) -> Vec<ProviderAvailability> {
    let mut providers: Vec<&Provider> = schedule.providers.iter().collect();
    providers.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    providers
        .into_iter()
        .map(|provider| ProviderAvailability {
            provider: provider.clone(),
            zones: compute_drop_zones(&schedule.appointments, &provider.id, date),
        })
        .collect()
}

/// Appointments on `date` whose provider is not in the roster.
pub fn unassigned_appointments(schedule: &Schedule, date: NaiveDate) -> Vec<&Appointment> {
    schedule
        .appointments
        .iter()
        .filter(|a| a.date() == date && schedule.provider(&a.provider_id).is_none())
        .collect()
}

/// The zone containing `position` (start inclusive, end exclusive).
pub fn find_drop_zone(position: i64, zones: &[DropZone]) -> Option<&DropZone> {
    zones
        .iter()
        .find(|zone| position >= zone.start_minutes && position < zone.end_minutes)
}

/// Day-view intervals of a provider's appointments on `date`.
pub(crate) fn busy_intervals(
    appointments: &[Appointment],
    provider_id: &str,
    date: NaiveDate,
    exclude_id: Option<&str>,
) -> Vec<(i64, i64)> {
    appointments
        .iter()
        .filter(|a| a.provider_id == provider_id && Some(a.id.as_str()) != exclude_id)
        .filter_map(|a| a.interval_on(date))
        .collect()
}
