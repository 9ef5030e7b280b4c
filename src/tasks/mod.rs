//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod event_log;
pub mod frame_driver;

// Re-export main items
pub use event_log::{event_log_task, log_events};
pub use frame_driver::{frame_driver_task, DEFAULT_FRAME_MS};
