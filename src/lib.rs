//! Countdown Timer - a drift-correcting countdown engine
//!
//! This library provides a countdown that ticks on a coarse frame scheduler,
//! anchors itself to the wall clock, and suspends cleanly while its host
//! surface is hidden, along with an HTTP host that drives it.

pub mod config;
pub mod error;
pub mod countdown;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::CountdownError;
pub use countdown::{Countdown, CountdownEvent, CountdownHandle, CountdownOptions, EmitPolicy, EventKind};
pub use state::{AppState, CountdownState, Phase, TimeUnits};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
