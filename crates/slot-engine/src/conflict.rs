//! Detect appointments overlapping a proposed placement.
//!
//! Intervals are half-open: an appointment ending exactly when another starts
//! is NOT a conflict.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, MoveCommand};
use crate::time;

/// Where an appointment sits: provider column and time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub provider_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Placement {
    /// Current placement of an appointment.
    pub fn of(appointment: &Appointment) -> Self {
        Self {
            provider_id: appointment.provider_id.clone(),
            start: appointment.start,
            end: appointment.end,
        }
    }

    pub fn at(provider_id: impl Into<String>, date: NaiveDate, start: i64, end: i64) -> Self {
        Self {
            provider_id: provider_id.into(),
            start: time::at_minutes(date, start),
            end: time::at_minutes(date, end),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// `(start, end)` in minutes since midnight of the start's day.
    pub fn minutes(&self) -> (i64, i64) {
        let date = self.date();
        (
            time::minutes_since(date, self.start),
            time::minutes_since(date, self.end),
        )
    }

    /// A command putting `appointment_id` at this placement.
    pub fn command_for(&self, appointment_id: &str) -> MoveCommand {
        MoveCommand {
            appointment_id: appointment_id.to_string(),
            new_provider_id: self.provider_id.clone(),
            new_start: self.start,
            new_end: self.end,
        }
    }
}

/// The appointment a proposed move collides with, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInfo {
    pub appointment_id: String,
    pub patient_name: String,
    pub visit_type: String,
    pub provider_id: String,
    /// Display name of the conflicting appointment's provider.
    pub provider_name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub overlap_minutes: i64,
}

impl ConflictInfo {
    pub fn new(appointment: &Appointment, provider_name: &str, overlap_minutes: i64) -> Self {
        Self {
            appointment_id: appointment.id.clone(),
            patient_name: appointment.patient_name.clone(),
            visit_type: appointment.visit_type.clone(),
            provider_id: appointment.provider_id.clone(),
            provider_name: provider_name.to_string(),
            start: appointment.start,
            end: appointment.end,
            overlap_minutes,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            provider_id: self.provider_id.clone(),
            start: self.start,
            end: self.end,
        }
    }
}

/// A move held back because it overlaps another appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMove {
    /// The dragged appointment as it was when the drag started.
    pub appointment: Appointment,
    pub proposed: Placement,
    pub original: Placement,
}

/// An appointment overlapping a proposed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap<'a> {
    pub appointment: &'a Appointment,
    pub overlap_minutes: i64,
}

/// All of a provider's appointments on `date` that intersect `[start, end)`,
/// ordered by start time. `exclude_id` is skipped (the dragged appointment).
///
/// Two intervals overlap when `a.start < b.end && b.start < a.end`.
pub fn find_overlaps<'a>(
    appointments: &'a [Appointment],
    provider_id: &str,
    date: NaiveDate,
    start: i64,
    end: i64,
    exclude_id: Option<&str>,
) -> Vec<Overlap<'a>> {
    let mut overlaps: Vec<Overlap<'a>> = appointments
        .iter()
        .filter(|a| a.is_on(provider_id, date) && Some(a.id.as_str()) != exclude_id)
        .filter_map(|a| {
            let (a_start, a_end) = a.minutes();
            if start < a_end && a_start < end {
                let overlap_minutes = end.min(a_end) - start.max(a_start);
                Some(Overlap {
                    appointment: a,
                    overlap_minutes,
                })
            } else {
                None
            }
        })
        .collect();

    overlaps.sort_by_key(|o| (o.appointment.start, o.appointment.end));
    overlaps
}

/// The earliest-starting overlapping appointment, if any.
pub fn first_overlap<'a>(
    appointments: &'a [Appointment],
    provider_id: &str,
    date: NaiveDate,
    start: i64,
    end: i64,
    exclude_id: Option<&str>,
) -> Option<Overlap<'a>> {
    find_overlaps(appointments, provider_id, date, start, end, exclude_id)
        .into_iter()
        .next()
}
