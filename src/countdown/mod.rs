//! Countdown engine module
//!
//! This module contains the drift-correcting countdown state machine, its
//! options and events, and the shared handle hosts use to drive it.

pub mod engine;
pub mod events;
pub mod handle;
pub mod options;

// Re-export main types
pub use engine::{Countdown, Formatter, Observer, ObserverId};
pub use events::{CountdownEvent, EmitPolicy, EventKind};
pub use handle::{Attachment, CountdownHandle};
pub use options::{validate_duration, CountdownOptions, DEFAULT_INTERVAL_MS};
