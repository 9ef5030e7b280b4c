//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{CountdownSnapshot, TimeUnits};
use crate::{
    countdown::{validate_duration, Countdown, CountdownEvent, CountdownHandle, CountdownOptions, Formatter},
    error::CountdownError,
    services::{FrameQueue, HostPage, SystemClock, Visibility, VisibilitySource},
};

/// Main application state that owns the hosted countdown
#[derive(Debug)]
pub struct AppState {
    /// The countdown and the surface it is attached to
    pub countdown: CountdownHandle,
    pub page: Arc<HostPage>,
    /// Frame requests waiting for the frame driver
    pub frames: FrameQueue,
    pub frame_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for delivered countdown events
    pub event_tx: broadcast::Sender<CountdownEvent>,
    /// Channel carrying the latest time-unit snapshot
    pub units_tx: Arc<watch::Sender<TimeUnits>>,
    /// Keep the receiver alive to prevent channel closure
    pub _units_rx: watch::Receiver<TimeUnits>,
}

impl AppState {
    /// Create the countdown, wire its events into the channels and wrap it
    pub fn new(
        port: u16,
        host: String,
        options: CountdownOptions,
        formatter: Formatter,
        frame_period: Duration,
    ) -> Result<Self, CountdownError> {
        let page = Arc::new(HostPage::new(Visibility::Visible));
        let frames = FrameQueue::new();

        let mut countdown = Countdown::new(
            options,
            Arc::new(SystemClock),
            Box::new(frames.clone()),
            Arc::clone(&page) as Arc<dyn VisibilitySource>,
        )?
        .with_formatter(formatter);

        let (event_tx, _) = broadcast::channel(100);
        let (units_tx, units_rx) = watch::channel(countdown.units());
        let units_tx = Arc::new(units_tx);

        let (events, units) = (event_tx.clone(), Arc::clone(&units_tx));
        countdown.subscribe(Box::new(move |event: &CountdownEvent| {
            // No subscribers is normal between log task restarts
            let _ = events.send(*event);
            if let Err(e) = units.send(event.units) {
                warn!("Failed to publish time units: {}", e);
            }
        }));

        Ok(Self {
            countdown: CountdownHandle::new(countdown),
            page,
            frames,
            frame_period,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
            units_tx,
            _units_rx: units_rx,
        })
    }

    /// Apply an operation to the countdown and record it as the last action
    pub fn apply<F>(&self, action: &str, operation: F) -> Result<CountdownSnapshot, CountdownError>
    where
        F: FnOnce(&mut Countdown),
    {
        let snapshot = self.countdown.with(|countdown| {
            operation(countdown);
            countdown.snapshot()
        })?;
        self.record_action(action);
        Ok(snapshot)
    }

    pub fn start(&self) -> Result<CountdownSnapshot, CountdownError> {
        info!("Starting countdown");
        self.apply("start", Countdown::start)
    }

    pub fn stop(&self) -> Result<CountdownSnapshot, CountdownError> {
        info!("Stopping countdown");
        self.apply("stop", Countdown::stop)
    }

    pub fn pause(&self) -> Result<CountdownSnapshot, CountdownError> {
        info!("Pausing countdown");
        self.apply("pause", Countdown::pause)
    }

    pub fn resume(&self) -> Result<CountdownSnapshot, CountdownError> {
        info!("Resuming countdown");
        self.apply("continue", Countdown::resume)
    }

    /// Replace the duration, rejecting negative input
    pub fn set_duration(&self, duration_ms: i64) -> Result<CountdownSnapshot, CountdownError> {
        let duration_ms = validate_duration(duration_ms)?;
        info!("Setting countdown duration to {}ms", duration_ms);
        self.apply("duration", |countdown| countdown.set_duration(duration_ms))
    }

    /// Change the host surface visibility; attached listeners update the countdown
    pub fn set_visibility(&self, visibility: Visibility) -> Result<CountdownSnapshot, CountdownError> {
        if self.page.set_visibility(visibility) {
            info!("Host surface is now {:?}", visibility);
        }
        let action = match visibility {
            Visibility::Visible => "visibility-visible",
            Visibility::Hidden => "visibility-hidden",
        };
        self.apply(action, |_| {})
    }

    /// Report a finished scroll gesture to attached listeners
    pub fn scroll_ended(&self) -> Result<CountdownSnapshot, CountdownError> {
        self.page.scroll_ended();
        self.apply("scroll", |_| {})
    }

    /// Get the current countdown snapshot
    pub fn get_snapshot(&self) -> Result<CountdownSnapshot, CountdownError> {
        self.countdown.with(|countdown| countdown.snapshot())
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
