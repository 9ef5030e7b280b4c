//! State management module
//!
//! This module contains the countdown data model, its time-unit view and the
//! application state shared by the HTTP handlers and background tasks.

pub mod app_state;
pub mod countdown_state;
pub mod time_units;

// Re-export main types
pub use app_state::AppState;
pub use countdown_state::{CountdownSnapshot, CountdownState, Phase};
pub use time_units::TimeUnits;
