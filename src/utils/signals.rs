//! Signal handling for graceful shutdown and host visibility

use std::sync::Arc;
use signal_hook::consts::{SIGCONT, SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::{info, warn};

use crate::{services::Visibility, state::AppState};

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let mut signals = match Signals::new([SIGTERM, SIGINT]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to create signal handler, falling back to ctrl-c: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
            }
            return;
        }
    };

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}

/// Map process signals onto host visibility.
///
/// SIGUSR1 hides the surface and SIGUSR2 shows it. SIGCONT means the process
/// was stopped and has just been resumed, so it is treated as a hidden period
/// ending now and the countdown reconciles against the wall clock.
pub async fn visibility_signal_task(state: Arc<AppState>) {
    let mut signals = match Signals::new([SIGUSR1, SIGUSR2, SIGCONT]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Visibility signals unavailable: {}", e);
            return;
        }
    };

    while let Some(signal) = signals.next().await {
        apply_visibility_signal(&state, signal);
    }
}

/// Visibility changes a signal stands for, in delivery order
pub fn signal_visibility(signal: i32) -> &'static [Visibility] {
    match signal {
        SIGUSR1 => &[Visibility::Hidden],
        SIGUSR2 => &[Visibility::Visible],
        SIGCONT => &[Visibility::Hidden, Visibility::Visible],
        _ => &[],
    }
}

/// Push the visibility changes for `signal` through the host page
pub fn apply_visibility_signal(state: &AppState, signal: i32) {
    for visibility in signal_visibility(signal) {
        if let Err(e) = state.set_visibility(*visibility) {
            warn!("Failed to apply visibility signal {}: {}", signal, e);
        }
    }
}
