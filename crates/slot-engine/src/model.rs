//! Snapshot types supplied by the appointment store and the commands sent back.
//!
//! Field names serialize in camelCase to match the calendar UI's JSON. The
//! engine only reads these values; every change it proposes is a
//! [`MoveCommand`].

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::time::{self, MINUTES_PER_DAY};

/// Lifecycle state of an appointment. Carried through untouched; every status
/// occupies its time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
}

/// A booked visit on a provider's column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    #[serde(alias = "clinicianId")]
    pub provider_id: String,
    pub visit_type: String,
    /// Local wall-clock start. Must be before `end`.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Calendar day the appointment is shown on.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// `(start, end)` in minutes since midnight of the appointment's own day.
    /// `end` exceeds 1440 when the visit runs past midnight.
    pub fn minutes(&self) -> (i64, i64) {
        let date = self.date();
        (
            time::minutes_since(date, self.start),
            time::minutes_since(date, self.end),
        )
    }

    /// `(start, end)` on the day view of `date`, clipped to `[0, 1440]`.
    /// `None` when the appointment is not shown on that day.
    pub fn interval_on(&self, date: NaiveDate) -> Option<(i64, i64)> {
        if self.date() != date {
            return None;
        }
        let (start, end) = self.minutes();
        Some((start.clamp(0, MINUTES_PER_DAY), end.clamp(0, MINUTES_PER_DAY)))
    }

    /// # Errors
    /// Returns `SlotError::InvalidAppointment` unless `start < end`.
    pub fn validate(&self) -> Result<()> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(SlotError::InvalidAppointment(self.id.clone()))
        }
    }

    pub fn is_on(&self, provider_id: &str, date: NaiveDate) -> bool {
        self.provider_id == provider_id && self.date() == date
    }
}

/// A clinician or staff member whose column appointments are dropped on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub credentials: String,
    /// Free-form staff type, e.g. "clinician".
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Instruction to place an appointment on a provider and time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCommand {
    pub appointment_id: String,
    pub new_provider_id: String,
    pub new_start: NaiveDateTime,
    pub new_end: NaiveDateTime,
}

impl MoveCommand {
    /// Build a command from day-view minutes on `date`.
    pub fn at(
        appointment_id: impl Into<String>,
        new_provider_id: impl Into<String>,
        date: NaiveDate,
        start_minutes: i64,
        end_minutes: i64,
    ) -> Self {
        Self {
            appointment_id: appointment_id.into(),
            new_provider_id: new_provider_id.into(),
            new_start: time::at_minutes(date, start_minutes),
            new_end: time::at_minutes(date, end_minutes),
        }
    }

    pub fn start_minutes(&self) -> i64 {
        time::minute_of_day(self.new_start)
    }

    /// End relative to the start's midnight, so it can exceed 1440.
    pub fn end_minutes(&self) -> i64 {
        time::minutes_since(self.new_start.date(), self.new_end)
    }
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} {}-{}",
            self.appointment_id,
            self.new_provider_id,
            time::minutes_to_time(self.start_minutes()),
            time::minutes_to_time(self.end_minutes()),
        )
    }
}

/// Receives emitted commands. Delivery is fire-and-forget: the engine never
/// observes whether the store applied a command.
pub trait CommandSink {
    fn submit(&mut self, command: MoveCommand);

    fn submit_all(&mut self, commands: impl IntoIterator<Item = MoveCommand>)
    where
        Self: Sized,
    {
        for command in commands {
            self.submit(command);
        }
    }
}

impl CommandSink for Vec<MoveCommand> {
    fn submit(&mut self, command: MoveCommand) {
        self.push(command);
    }
}

/// Read-only roster and appointment snapshot for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl Schedule {
    /// Parse a `{ "providers": [...], "appointments": [...] }` snapshot.
    ///
    /// # Errors
    /// Returns `SlotError::Json` if the input is not a valid snapshot, and
    /// `SlotError::InvalidAppointment` for an appointment that does not start
    /// before it ends.
    pub fn from_json(json: &str) -> Result<Self> {
        let schedule: Self = serde_json::from_str(json)?;
        schedule.validate()?;
        Ok(schedule)
    }

    /// # Errors
    /// The first appointment failing [`Appointment::validate`].
    pub fn validate(&self) -> Result<()> {
        self.appointments.iter().try_for_each(Appointment::validate)
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// # Errors
    /// Returns `SlotError::UnknownAppointment` if no appointment has `id`.
    pub fn require_appointment(&self, id: &str) -> Result<&Appointment> {
        self.appointment(id)
            .ok_or_else(|| SlotError::UnknownAppointment(id.to_string()))
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }
}

/// Display name for a provider id, falling back to the id itself for columns
/// that are not in the roster (e.g. "unassigned").
pub fn provider_display_name<'a>(providers: &'a [Provider], provider_id: &'a str) -> &'a str {
    providers
        .iter()
        .find(|p| p.id == provider_id)
        .map(|p| p.display_name.as_str())
        .unwrap_or(provider_id)
}
