//! Turn a detected conflict and the user's choice into move commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::availability::first_fit;
use crate::config::{EngineConfig, MoveNextPolicy};
use crate::conflict::{ConflictInfo, PendingMove, Placement};
use crate::error::{Result, SlotError};
use crate::model::{Appointment, MoveCommand};
use crate::time;

/// How to settle a conflicting drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Leave everything where it was.
    Cancel,
    /// Put the dragged appointment on the target slot regardless.
    Force,
    /// Dragged goes to the target slot, conflicting goes to the dragged one's
    /// original slot.
    Swap,
    /// Relocate the conflicting appointment to the next free gap on its
    /// provider's day, then move the dragged one in.
    MoveNext,
}

impl ResolutionStrategy {
    pub const ALL: [ResolutionStrategy; 4] = [Self::Cancel, Self::Force, Self::Swap, Self::MoveNext];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Force => "force",
            Self::Swap => "swap",
            Self::MoveNext => "move-next",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| SlotError::UnknownStrategy(s.to_string()))
    }
}

/// Commands that settle `conflict` for `pending` under `strategy`.
///
/// `appointments` is the snapshot `move-next` scans for a free gap; the other
/// strategies ignore it. No strategy re-validates the slots it emits.
///
/// # Errors
/// `SlotError::NoRescueSlot` when `move-next` finds no gap and the policy is
/// [`MoveNextPolicy::Atomic`].
pub fn resolve_conflict(
    strategy: ResolutionStrategy,
    pending: &PendingMove,
    conflict: &ConflictInfo,
    appointments: &[Appointment],
    config: &EngineConfig,
) -> Result<Vec<MoveCommand>> {
    let dragged_id = pending.appointment.id.as_str();

    let commands = match strategy {
        ResolutionStrategy::Cancel => Vec::new(),
        ResolutionStrategy::Force => vec![pending.proposed.command_for(dragged_id)],
        ResolutionStrategy::Swap => {
            let slot_minutes = pending.original.duration_minutes();
            let appointment_minutes = conflict.placement().duration_minutes();
            if slot_minutes != appointment_minutes {
                warn!(
                    appointment = %conflict.appointment_id,
                    appointment_minutes,
                    slot_minutes,
                    "swapping into a slot of a different length"
                );
            }
            vec![
                pending.proposed.command_for(dragged_id),
                pending.original.command_for(&conflict.appointment_id),
            ]
        }
        ResolutionStrategy::MoveNext => {
            let mut commands = Vec::with_capacity(2);
            match find_rescue_slot(pending, conflict, appointments, config) {
                Some(slot) => commands.push(slot.command_for(&conflict.appointment_id)),
                None => {
                    let (start, end) = conflict.placement().minutes();
                    warn!(
                        appointment = %conflict.appointment_id,
                        duration_minutes = end - start,
                        "no free slot for the conflicting appointment"
                    );
                    if config.move_next_policy == MoveNextPolicy::Atomic {
                        return Err(SlotError::NoRescueSlot {
                            appointment_id: conflict.appointment_id.clone(),
                            duration_minutes: end - start,
                            until: config.day_end_threshold,
                        });
                    }
                }
            }
            commands.push(pending.proposed.command_for(dragged_id));
            commands
        }
    };

    info!(
        %strategy,
        appointment = dragged_id,
        commands = commands.len(),
        "conflict resolved"
    );
    Ok(commands)
}

/// First gap on the conflicting provider's day that holds the conflicting
/// appointment and ends by the day-end threshold.
///
/// The scan starts at the conflicting appointment's snapped end and falls back
/// to the start of the day. Neither appointment of the conflict blocks the
/// scan, but the dragged appointment's proposed slot does.
pub fn find_rescue_slot(
    pending: &PendingMove,
    conflict: &ConflictInfo,
    appointments: &[Appointment],
    config: &EngineConfig,
) -> Option<Placement> {
    let placement = conflict.placement();
    let date = placement.date();
    let (_, conflict_end) = placement.minutes();
    let duration = placement.duration_minutes();

    let mut busy: Vec<(i64, i64)> = appointments
        .iter()
        .filter(|a| a.id != conflict.appointment_id && a.id != pending.appointment.id)
        .filter(|a| a.provider_id == conflict.provider_id)
        .filter_map(|a| a.interval_on(date))
        .collect();
    if pending.proposed.provider_id == conflict.provider_id && pending.proposed.date() == date {
        busy.push(pending.proposed.minutes());
    }

    let until = config.day_end_threshold;
    let from = time::snap_to(conflict_end, config.snap_minutes);

    first_fit(&busy, from, until, duration)
        .or_else(|| first_fit(&busy, 0, until, duration))
        .map(|gap| Placement::at(&conflict.provider_id, date, gap.start, gap.start + duration))
}
