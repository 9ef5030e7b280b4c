//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod signals;

// Re-export main functions
pub use signals::{apply_visibility_signal, shutdown_signal, signal_visibility, visibility_signal_task};
