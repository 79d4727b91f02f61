//! Drag-and-drop interaction: validate a drop and track the one active drag.
//!
//! [`evaluate_drop`] is the stateless core. [`DragSession`] wraps it in the
//! `Idle → Dragging → AwaitingConflictResolution → Idle` state machine. The
//! session is a plain value: every transition borrows the current state and
//! returns the next one, so a rejected transition leaves the caller's state
//! untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::availability::compute_drop_zones_excluding;
use crate::config::EngineConfig;
use crate::conflict::{first_overlap, ConflictInfo, PendingMove, Placement};
use crate::error::{Result, SlotError};
use crate::model::{provider_display_name, Appointment, MoveCommand, Provider};
use crate::resolver::{resolve_conflict, ResolutionStrategy};
use crate::time::{self, MINUTES_PER_DAY};

/// Why a drop produced neither a move nor a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// The snapped interval starts before midnight or ends after the day view
    /// and overlaps nothing.
    OutsideDay,
    /// The interval is not inside a drop zone and overlaps nothing, e.g. a
    /// non-positive duration.
    NoDropZone,
}

/// Result of dropping an appointment on a provider column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DropOutcome {
    Move { command: MoveCommand },
    Conflict {
        conflict: ConflictInfo,
        pending: PendingMove,
    },
    Rejected { reason: RejectReason },
}

/// Evaluate a drop with the default configuration.
///
/// `raw_position` is the pointer position in minutes since midnight; it is
/// snapped to the quarter hour and the dragged appointment keeps its duration.
pub fn evaluate_drop(
    appointments: &[Appointment],
    providers: &[Provider],
    dragged: &Appointment,
    target_provider_id: &str,
    raw_position: i64,
) -> DropOutcome {
    evaluate_drop_with(
        &EngineConfig::default(),
        appointments,
        providers,
        dragged,
        target_provider_id,
        raw_position,
    )
}

/// Evaluate a drop of `dragged` on `target_provider_id` at `raw_position`.
///
/// The drop lands on the dragged appointment's own day. The dragged appointment
/// never blocks itself. An overlap is always a conflict, even when the interval
/// also leaves the day view; without one, such an interval is rejected.
pub fn evaluate_drop_with(
    config: &EngineConfig,
    appointments: &[Appointment],
    providers: &[Provider],
    dragged: &Appointment,
    target_provider_id: &str,
    raw_position: i64,
) -> DropOutcome {
    let date = dragged.date();
    let start = time::snap_to(raw_position, config.snap_minutes);
    let end = start.saturating_add(dragged.duration_minutes());

    debug!(
        appointment = %dragged.id,
        target = target_provider_id,
        raw_position,
        start,
        end,
        "evaluating drop"
    );

    let overlap = first_overlap(
        appointments,
        target_provider_id,
        date,
        start,
        end,
        Some(&dragged.id),
    );
    let outside_day = start < 0 || end > MINUTES_PER_DAY;
    let fits = !outside_day
        && compute_drop_zones_excluding(appointments, target_provider_id, date, Some(&dragged.id))
            .iter()
            .any(|zone| zone.contains_range(start, end));

    match overlap {
        None if fits => {
            let command = MoveCommand::at(&dragged.id, target_provider_id, date, start, end);
            info!(%command, "drop accepted");
            DropOutcome::Move { command }
        }
        None if outside_day => {
            warn!(appointment = %dragged.id, start, end, "drop outside the day view");
            DropOutcome::Rejected {
                reason: RejectReason::OutsideDay,
            }
        }
        Some(overlap) => {
            let provider_name = provider_display_name(providers, &overlap.appointment.provider_id);
            let conflict = ConflictInfo::new(overlap.appointment, provider_name, overlap.overlap_minutes);
            let pending = PendingMove {
                appointment: dragged.clone(),
                proposed: Placement::at(target_provider_id, date, start, end),
                original: Placement::of(dragged),
            };
            info!(
                appointment = %dragged.id,
                conflicting = %conflict.appointment_id,
                overlap_minutes = conflict.overlap_minutes,
                "drop conflicts with an existing appointment"
            );
            DropOutcome::Conflict { conflict, pending }
        }
        None => {
            warn!(appointment = %dragged.id, start, end, "drop outside every drop zone");
            DropOutcome::Rejected {
                reason: RejectReason::NoDropZone,
            }
        }
    }
}

/// Column and snapped position currently under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverTarget {
    pub provider_id: String,
    pub snapped_minutes: i64,
}

/// The appointment being dragged and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragState {
    pub appointment: Appointment,
    pub original: Placement,
    pub hover: Option<HoverTarget>,
}

impl DragState {
    pub fn original_minutes(&self) -> (i64, i64) {
        self.original.minutes()
    }
}

/// The calendar's single drag interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum DragSession {
    #[default]
    Idle,
    Dragging(DragState),
    AwaitingConflictResolution {
        conflict: ConflictInfo,
        pending: PendingMove,
    },
}

impl DragSession {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        match self {
            Self::Dragging(state) => Some(state),
            _ => None,
        }
    }

    /// The conflict awaiting a decision, if any.
    pub fn pending_conflict(&self) -> Option<(&ConflictInfo, &PendingMove)> {
        match self {
            Self::AwaitingConflictResolution { conflict, pending } => Some((conflict, pending)),
            _ => None,
        }
    }

    /// Begin dragging `appointment`.
    ///
    /// # Errors
    /// `SlotError::DragInProgress` unless the session is idle.
    pub fn start(&self, appointment: &Appointment) -> Result<Self> {
        match self {
            Self::Idle => {
                debug!(appointment = %appointment.id, "drag started");
                Ok(Self::Dragging(DragState {
                    appointment: appointment.clone(),
                    original: Placement::of(appointment),
                    hover: None,
                }))
            }
            Self::Dragging(state) => Err(SlotError::DragInProgress(state.appointment.id.clone())),
            Self::AwaitingConflictResolution { pending, .. } => {
                Err(SlotError::DragInProgress(pending.appointment.id.clone()))
            }
        }
    }

    /// Record the column and snapped position under the pointer.
    ///
    /// # Errors
    /// `SlotError::NoActiveDrag` unless dragging.
    pub fn hover(&self, provider_id: &str, raw_position: i64, config: &EngineConfig) -> Result<Self> {
        let Self::Dragging(state) = self else {
            return Err(SlotError::NoActiveDrag);
        };
        let mut state = state.clone();
        state.hover = Some(HoverTarget {
            provider_id: provider_id.to_string(),
            snapped_minutes: time::snap_to(raw_position, config.snap_minutes),
        });
        Ok(Self::Dragging(state))
    }

    /// Release the dragged appointment on `target_provider_id` at `raw_position`.
    ///
    /// A successful move or a rejected drop returns to `Idle`; a conflict moves
    /// to `AwaitingConflictResolution`.
    ///
    /// # Errors
    /// `SlotError::NoActiveDrag` unless dragging.
    pub fn end(
        &self,
        appointments: &[Appointment],
        providers: &[Provider],
        target_provider_id: &str,
        raw_position: i64,
        config: &EngineConfig,
    ) -> Result<(Self, DropOutcome)> {
        let Self::Dragging(state) = self else {
            return Err(SlotError::NoActiveDrag);
        };

        let outcome = evaluate_drop_with(
            config,
            appointments,
            providers,
            &state.appointment,
            target_provider_id,
            raw_position,
        );

        let next = match &outcome {
            DropOutcome::Conflict { conflict, pending } => Self::AwaitingConflictResolution {
                conflict: conflict.clone(),
                pending: pending.clone(),
            },
            DropOutcome::Move { .. } | DropOutcome::Rejected { .. } => Self::Idle,
        };
        Ok((next, outcome))
    }

    /// Release without a valid target.
    ///
    /// # Errors
    /// `SlotError::NoActiveDrag` unless dragging.
    pub fn cancel(&self) -> Result<Self> {
        match self {
            Self::Dragging(state) => {
                debug!(appointment = %state.appointment.id, "drag cancelled");
                Ok(Self::Idle)
            }
            _ => Err(SlotError::NoActiveDrag),
        }
    }

    /// Apply `strategy` to the pending conflict and return to `Idle`.
    ///
    /// # Errors
    /// `SlotError::NoPendingConflict` unless a conflict is awaiting resolution,
    /// and whatever [`resolve_conflict`] reports. On error the session keeps
    /// its current state so another strategy can be chosen.
    pub fn resolve(
        &self,
        strategy: ResolutionStrategy,
        appointments: &[Appointment],
        config: &EngineConfig,
    ) -> Result<(Self, Vec<MoveCommand>)> {
        let Self::AwaitingConflictResolution { conflict, pending } = self else {
            return Err(SlotError::NoPendingConflict);
        };
        let commands = resolve_conflict(strategy, pending, conflict, appointments, config)?;
        Ok((Self::Idle, commands))
    }

    /// Close the conflict prompt without choosing; same as `cancel`.
    ///
    /// # Errors
    /// `SlotError::NoPendingConflict` unless a conflict is awaiting resolution.
    pub fn dismiss_conflict(&self) -> Result<Self> {
        self.resolve(ResolutionStrategy::Cancel, &[], &EngineConfig::default())
            .map(|(next, _)| next)
    }
}
