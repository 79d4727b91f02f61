//! Engine configuration: grid constants and conflict-resolution policies.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::time::{DAY_END_THRESHOLD, MINUTES_PER_DAY, QUARTER_HOUR_MINUTES};

/// What `move-next` does when the conflicting appointment has nowhere to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveNextPolicy {
    /// Still move the dragged appointment; the conflicting one stays put.
    #[default]
    Partial,
    /// Emit nothing and report `SlotError::NoRescueSlot`.
    Atomic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Drop positions snap to multiples of this many minutes.
    pub snap_minutes: i64,
    /// Rescue slots found by `move-next` must end by this minute of the day.
    pub day_end_threshold: i64,
    pub move_next_policy: MoveNextPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_minutes: QUARTER_HOUR_MINUTES,
            day_end_threshold: DAY_END_THRESHOLD,
            move_next_policy: MoveNextPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// # Errors
    /// Returns `SlotError::InvalidConfig` for a non-positive or longer-than-a-day
    /// snap, or a threshold outside `(0, 1440]`.
    pub fn validate(&self) -> Result<()> {
        if self.snap_minutes <= 0 || self.snap_minutes > MINUTES_PER_DAY {
            return Err(SlotError::InvalidConfig(format!(
                "snap_minutes must be in 1..={}, got {}",
                MINUTES_PER_DAY, self.snap_minutes
            )));
        }
        if self.day_end_threshold <= 0 || self.day_end_threshold > MINUTES_PER_DAY {
            return Err(SlotError::InvalidConfig(format!(
                "day_end_threshold must be in 1..={}, got {}",
                MINUTES_PER_DAY, self.day_end_threshold
            )));
        }
        Ok(())
    }
}
