//! Error types for slot-engine operations.
//!
//! Scheduling outcomes (conflicts, rejected drops) are returned as data, not as
//! errors. `SlotError` covers malformed input and violations of the drag
//! session's state machine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    /// A time string did not contain an `HH:MM` component.
    #[error("Invalid time: {0:?}")]
    InvalidTime(String),

    /// The snapshot JSON could not be parsed.
    #[error("Invalid schedule JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unknown resolution strategy: {0:?} (expected cancel, force, swap or move-next)")]
    UnknownStrategy(String),

    /// An appointment in the snapshot does not start before it ends.
    #[error("Invalid appointment {0}: start must be before end")]
    InvalidAppointment(String),

    #[error("Unknown appointment: {0}")]
    UnknownAppointment(String),

    /// A drag was started while another drag or an unresolved conflict is active.
    #[error("A drag is already in progress for appointment {0}")]
    DragInProgress(String),

    #[error("No drag is in progress")]
    NoActiveDrag,

    #[error("No conflict is awaiting resolution")]
    NoPendingConflict,

    /// `move-next` found no free slot and the policy is atomic.
    #[error("No free slot for appointment {appointment_id} ({duration_minutes} min) before minute {until}")]
    NoRescueSlot {
        appointment_id: String,
        duration_minutes: i64,
        until: i64,
    },
}

pub type Result<T> = std::result::Result<T, SlotError>;
