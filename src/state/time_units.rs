//! Time-unit decomposition of the remaining duration

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MS_PER_SECOND: u64 = 1000;
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * 60;
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * 60;
pub const MS_PER_DAY: u64 = MS_PER_HOUR * 24;

/// Snapshot of the remaining time split into display units.
///
/// The plain fields are the fixed-radix digits (`hours` is always below 24);
/// the `total_*` fields are cumulative, so `total_hours` keeps counting past a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeUnits {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
    pub total_days: u64,
    pub total_hours: u64,
    pub total_minutes: u64,
    pub total_seconds: u64,
    pub total_milliseconds: u64,
}

impl TimeUnits {
    /// Decompose a millisecond count
    pub fn from_millis(ms: u64) -> Self {
        let days = ms / MS_PER_DAY;
        Self {
            days,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
            milliseconds: ms % MS_PER_SECOND,
            total_days: days,
            total_hours: ms / MS_PER_HOUR,
            total_minutes: ms / MS_PER_MINUTE,
            total_seconds: ms / MS_PER_SECOND,
            total_milliseconds: ms,
        }
    }

    /// `HH:MM:SS` with cumulative hours
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.total_hours, self.minutes, self.seconds)
    }

    /// `Dd HH:MM:SS.mmm`
    pub fn full(&self) -> String {
        format!(
            "{}d {:02}:{:02}:{:02}.{:03}",
            self.days, self.hours, self.minutes, self.seconds, self.milliseconds
        )
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clock())
    }
}
