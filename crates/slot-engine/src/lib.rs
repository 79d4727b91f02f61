//! # slot-engine
//!
//! Availability and conflict resolution for drag-and-drop clinical calendars.
//!
//! The engine reads a snapshot of providers and appointments, computes each
//! provider's free intervals for a day, validates a dragged appointment's drop,
//! and turns overlaps into structured conflicts that one of four strategies
//! settles. It never mutates appointments: every change it proposes is a
//! [`MoveCommand`] for the appointment store to apply.
//!
//! ## Modules
//!
//! - [`time`]: Minute-of-day arithmetic: snapping, parsing, formatting
//! - [`model`]: Appointments, providers, snapshots, move commands
//! - [`availability`]: Drop zones (free intervals per provider and day)
//! - [`conflict`]: Overlap detection and the conflict payload
//! - [`drag`]: Drop evaluation and the drag session state machine
//! - [`resolver`]: `cancel`, `force`, `swap` and `move-next` resolution
//! - [`clock`]: Externally driven "now" for the time marker
//! - [`config`]: Grid constants and resolution policies
//! - [`error`]: Error types

pub mod availability;
pub mod clock;
pub mod config;
pub mod conflict;
pub mod drag;
pub mod error;
pub mod model;
pub mod resolver;
pub mod time;

pub use availability::{compute_all_drop_zones, compute_drop_zones, DropZone};
pub use config::{EngineConfig, MoveNextPolicy};
pub use conflict::{ConflictInfo, PendingMove, Placement};
pub use drag::{evaluate_drop, evaluate_drop_with, DragSession, DropOutcome, RejectReason};
pub use error::SlotError;
pub use model::{Appointment, AppointmentStatus, CommandSink, MoveCommand, Provider, Schedule};
pub use resolver::{resolve_conflict, ResolutionStrategy};
