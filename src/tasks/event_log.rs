//! Countdown event logging background task

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{
    countdown::{CountdownEvent, EventKind},
    state::AppState,
};

/// Background task that logs every lifecycle event the countdown delivers
pub async fn event_log_task(state: Arc<AppState>) {
    info!("Starting countdown event log task");

    let event_rx = state.event_tx.subscribe();
    drop(state);

    let logged = log_events(event_rx).await;
    debug!("Event log task stopped after {} events", logged);
}

/// Log events until the channel closes, returning how many were logged
pub async fn log_events(mut event_rx: broadcast::Receiver<CountdownEvent>) -> usize {
    let mut logged = 0;

    loop {
        match event_rx.recv().await {
            Ok(event) => {
                let remaining = event.units.clock();
                match event.kind {
                    EventKind::Count => debug!("count: {} remaining", remaining),
                    EventKind::Finish => info!("Countdown finished"),
                    kind => info!("{}: {} remaining", kind, remaining),
                }
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event log lagged behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Event channel closed, stopping event log");
                return logged;
            }
        }
    }
}
