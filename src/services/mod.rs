//! Host collaborators module
//!
//! This module contains the external services the countdown engine consumes:
//! a wall clock, a frame scheduler and the host surface (visibility, scroll).

pub mod clock;
pub mod frames;
pub mod manual;
pub mod page;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use frames::{FrameHandle, FrameQueue, FrameScheduler};
pub use manual::ManualClock;
pub use page::{HostPage, Listener, ListenerId, ScrollSource, Visibility, VisibilitySource};
