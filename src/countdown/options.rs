//! Validated construction inputs for a countdown

use serde::{Deserialize, Serialize};

use super::EmitPolicy;
use crate::error::CountdownError;

/// Default tick interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Countdown configuration, checked once at the boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownOptions {
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Amount removed per tick
    pub interval_ms: u64,
    pub auto_start: bool,
    pub emit: EmitPolicy,
    /// Halt while hidden and reconcile against the wall clock when shown again
    pub visibility_fix: bool,
    /// Re-anchor remaining time whenever a scroll gesture ends
    pub scroll_fix: bool,
}

impl CountdownOptions {
    /// Options for the given duration with every other field at its default
    pub fn new(duration_ms: i64) -> Result<Self, CountdownError> {
        Ok(Self {
            duration_ms: validate_duration(duration_ms)?,
            ..Self::default()
        })
    }

    pub fn with_interval(mut self, interval_ms: u64) -> Result<Self, CountdownError> {
        if interval_ms == 0 {
            return Err(CountdownError::ZeroInterval);
        }
        self.interval_ms = interval_ms;
        Ok(self)
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn with_emit(mut self, emit: EmitPolicy) -> Self {
        self.emit = emit;
        self
    }

    pub fn with_visibility_fix(mut self, enabled: bool) -> Self {
        self.visibility_fix = enabled;
        self
    }

    pub fn with_scroll_fix(mut self, enabled: bool) -> Self {
        self.scroll_fix = enabled;
        self
    }

    /// Re-check options built by hand or deserialized
    pub fn validate(&self) -> Result<(), CountdownError> {
        if self.interval_ms == 0 {
            return Err(CountdownError::ZeroInterval);
        }
        Ok(())
    }
}

impl Default for CountdownOptions {
    fn default() -> Self {
        Self {
            duration_ms: 0,
            interval_ms: DEFAULT_INTERVAL_MS,
            auto_start: true,
            emit: EmitPolicy::All,
            visibility_fix: true,
            scroll_fix: false,
        }
    }
}

/// Reject negative duration input
pub fn validate_duration(duration_ms: i64) -> Result<u64, CountdownError> {
    u64::try_from(duration_ms).map_err(|_| CountdownError::NegativeDuration(duration_ms))
}
