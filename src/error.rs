//! Error types for countdown configuration and shared access

use thiserror::Error;

/// Errors raised at the configuration boundary or by the shared handle.
///
/// Misused operations (pausing an idle countdown, starting twice, ...) are
/// not errors; the engine ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    #[error("duration must be non-negative, got {0}ms")]
    NegativeDuration(i64),

    #[error("tick interval must be greater than zero")]
    ZeroInterval,

    #[error("unknown countdown event: {0}")]
    UnknownEvent(String),

    #[error("failed to lock countdown: {0}")]
    LockPoisoned(String),
}

impl CountdownError {
    /// Whether the error was caused by caller input rather than internal state
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::LockPoisoned(_))
    }
}
