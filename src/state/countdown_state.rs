//! Countdown state structure and lifecycle phase

use serde::{Deserialize, Serialize};

use super::TimeUnits;
use crate::services::Visibility;

/// Lifecycle phase derived from the countdown flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not started yet, or re-armed by a duration change after ending
    Idle,
    Counting,
    Paused,
    /// Running, but the tick loop is halted while the host surface is hidden
    Suspended,
    /// Stopped explicitly or finished naturally
    Ended,
}

/// Mutable countdown state owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountdownState {
    /// Milliseconds left until completion
    pub remaining_ms: u64,
    /// Wall-clock instant (ms) at which the countdown reaches zero, 0 when cleared
    pub finish_at_ms: u64,
    /// A tick loop is scheduled
    pub is_counting: bool,
    /// Started and not yet stopped or finished
    pub is_running: bool,
    pub is_paused: bool,
    /// The last run was stopped or finished
    pub has_ended: bool,
}

impl CountdownState {
    /// Create an empty state with nothing remaining
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        if self.is_counting {
            Phase::Counting
        } else if self.is_paused {
            Phase::Paused
        } else if self.is_running {
            Phase::Suspended
        } else if self.has_ended {
            Phase::Ended
        } else {
            Phase::Idle
        }
    }

    /// Time-unit snapshot of the remaining duration
    pub fn units(&self) -> TimeUnits {
        TimeUnits::from_millis(self.remaining_ms)
    }

    /// Check the flag invariants
    pub fn is_consistent(&self) -> bool {
        (!self.is_counting || self.is_running)
            && (!self.is_paused || (self.is_running && !self.is_counting))
    }
}

/// Read-only view of a countdown handed to hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub phase: Phase,
    pub state: CountdownState,
    pub units: TimeUnits,
    /// Formatted remaining time
    pub display: String,
    pub visibility: Visibility,
}
