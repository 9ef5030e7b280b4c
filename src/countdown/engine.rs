//! Drift-correcting countdown engine

use std::{fmt, sync::Arc};

use tracing::{debug, trace};

use super::{CountdownEvent, CountdownOptions, EventKind};
use crate::{
    error::CountdownError,
    services::{Clock, FrameHandle, FrameScheduler, Visibility, VisibilitySource},
    state::{CountdownSnapshot, CountdownState, Phase, TimeUnits},
};

/// Turns a time-unit snapshot into display text
pub type Formatter = Arc<dyn Fn(&TimeUnits) -> String + Send + Sync>;

/// Receives every delivered lifecycle event
pub type Observer = Box<dyn FnMut(&CountdownEvent) + Send>;

/// Registration token for an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Frames seen between two ticks
#[derive(Debug)]
struct Cycle {
    handle: FrameHandle,
    init_ms: u64,
    frames: u32,
    delay_ms: u64,
}

/// Countdown state machine driven by frame callbacks.
///
/// Every tick removes exactly `interval_ms` from the remaining time. Ticks are
/// released on the frame whose timestamp lands nearest the target instant,
/// judged against the running average frame spacing of the current cycle, so
/// frame jitter does not accumulate into drift. Wall-clock anchoring covers
/// the gaps where no frames arrive at all (pause, hidden surface).
pub struct Countdown {
    options: CountdownOptions,
    state: CountdownState,
    cycle: Option<Cycle>,
    clock: Arc<dyn Clock>,
    frames: Box<dyn FrameScheduler>,
    visibility: Arc<dyn VisibilitySource>,
    formatter: Formatter,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Countdown {
    /// Create an idle countdown loaded with the configured duration
    pub fn new(
        options: CountdownOptions,
        clock: Arc<dyn Clock>,
        frames: Box<dyn FrameScheduler>,
        visibility: Arc<dyn VisibilitySource>,
    ) -> Result<Self, CountdownError> {
        options.validate()?;
        let state = CountdownState {
            remaining_ms: options.duration_ms,
            ..CountdownState::new()
        };

        Ok(Self {
            options,
            state,
            cycle: None,
            clock,
            frames,
            visibility,
            formatter: Arc::new(|units: &TimeUnits| units.clock()),
            observers: Vec::new(),
            next_observer: 1,
        })
    }

    /// Replace the display formatter
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// The surface this countdown checks before ticking
    pub fn visibility_source(&self) -> Arc<dyn VisibilitySource> {
        Arc::clone(&self.visibility)
    }

    pub fn options(&self) -> &CountdownOptions {
        &self.options
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.remaining_ms
    }

    pub fn units(&self) -> TimeUnits {
        self.state.units()
    }

    /// Formatted remaining time
    pub fn display(&self) -> String {
        (self.formatter)(&self.units())
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            phase: self.phase(),
            state: self.state,
            units: self.units(),
            display: self.display(),
            visibility: self.visibility.visibility(),
        }
    }

    /// Register an observer for delivered events
    pub fn subscribe(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.retain(|(existing, _)| *existing != id);
    }

    /// Start counting down.
    ///
    /// Ignored while counting, while the host surface is hidden, or when
    /// nothing remains. After a stop or finish the configured duration is
    /// loaded again first.
    pub fn start(&mut self) {
        if self.state.is_counting || !self.visibility.visibility().is_visible() {
            return;
        }
        if self.state.has_ended && self.state.remaining_ms == 0 {
            self.state.remaining_ms = self.options.duration_ms;
        }
        if self.state.remaining_ms == 0 {
            return;
        }

        self.state.finish_at_ms = self.now().saturating_add(self.state.remaining_ms);
        self.state.is_running = true;
        self.state.is_counting = true;
        self.state.is_paused = false;
        self.state.has_ended = false;
        debug!("Countdown started with {}ms remaining", self.state.remaining_ms);
        self.emit(EventKind::Start);
        self.count();
    }

    /// Start if the auto-start option is set
    pub fn auto_start(&mut self) {
        if self.options.auto_start {
            self.start();
        }
    }

    /// Abort the countdown, zeroing the remaining time
    pub fn stop(&mut self) {
        self.cancel_cycle();
        self.emit(EventKind::End);
        self.state.is_counting = false;
        self.state.is_running = false;
        self.state.is_paused = false;
        self.state.has_ended = true;
        self.state.remaining_ms = 0;
        self.state.finish_at_ms = 0;
        debug!("Countdown stopped");
    }

    pub fn pause(&mut self) {
        if !self.state.is_counting || self.state.is_paused {
            return;
        }
        self.halt();
        self.state.is_paused = true;
        debug!("Countdown paused with {}ms remaining", self.state.remaining_ms);
        self.emit(EventKind::Pause);
    }

    /// Resume from a pause; emitted as `continue`
    pub fn resume(&mut self) {
        if self.state.is_counting || !self.state.is_running || !self.state.is_paused {
            return;
        }
        self.state.is_paused = false;
        self.state.finish_at_ms = self.now().saturating_add(self.state.remaining_ms);
        if self.can_tick() {
            self.recover();
        }
        debug!("Countdown resumed with {}ms remaining", self.state.remaining_ms);
        self.emit(EventKind::Continue);
    }

    /// Replace the duration live, keeping the run and pause state
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.halt();
        self.options.duration_ms = duration_ms;
        self.state.remaining_ms = duration_ms;
        self.state.finish_at_ms = self.now().saturating_add(duration_ms);
        if !self.state.is_running {
            self.state.has_ended = false;
        }
        if self.can_tick() {
            self.recover();
        }
        debug!("Countdown duration set to {}ms", duration_ms);
    }

    /// React to the host surface being hidden or shown
    pub fn handle_visibility_change(&mut self, visibility: Visibility) {
        match visibility {
            Visibility::Hidden => {
                self.emit(EventKind::VisibilityHidden);
                if self.options.visibility_fix {
                    self.halt();
                }
            }
            Visibility::Visible => {
                if self.options.visibility_fix {
                    self.recover();
                }
                self.emit(EventKind::VisibilityVisible);
            }
        }
    }

    /// Reconcile against the wall clock after a scroll gesture
    pub fn handle_scroll_end(&mut self) {
        if self.options.scroll_fix {
            self.correct_time();
        }
    }

    /// Frame callback entry point. Handles other than the outstanding request
    /// are stale and ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) {
        let now = self.now();
        let Some(cycle) = self.cycle.as_mut().filter(|c| c.handle == handle) else {
            trace!("Ignoring stale frame {:?}", handle);
            return;
        };

        cycle.frames += 1;
        let elapsed = now.saturating_sub(cycle.init_ms) as f64;
        let average_frame = elapsed / f64::from(cycle.frames);

        // Release on the frame nearest the target instant; firing only once
        // `elapsed >= delay` would land late on every cycle.
        if cycle.delay_ms as f64 - elapsed <= average_frame / 2.0 {
            trace!(
                "Tick after {} frames, {}ms elapsed for {}ms target",
                cycle.frames,
                elapsed,
                cycle.delay_ms
            );
            self.cycle = None;
            self.minus();
        } else {
            cycle.handle = self.frames.request_frame();
        }
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    fn can_tick(&self) -> bool {
        !self.options.visibility_fix || self.visibility.visibility().is_visible()
    }

    fn cancel_cycle(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            self.frames.cancel_frame(cycle.handle);
        }
    }

    /// Schedule the next tick cycle
    fn count(&mut self) {
        if !self.state.is_counting {
            return;
        }

        let delay_ms = self.state.remaining_ms.min(self.options.interval_ms);
        if delay_ms == 0 {
            self.finish();
            return;
        }

        let handle = self.frames.request_frame();
        self.cycle = Some(Cycle {
            handle,
            init_ms: self.now(),
            frames: 0,
            delay_ms,
        });
    }

    fn minus(&mut self) {
        if !self.state.is_counting {
            return;
        }

        self.state.remaining_ms = self.state.remaining_ms.saturating_sub(self.options.interval_ms);
        // The decrement that reaches zero still reports `count`, ahead of
        // `finish`, so every interval removed is observable.
        self.emit(EventKind::Count);

        if self.state.remaining_ms == 0 {
            self.finish();
        } else {
            self.count();
        }
    }

    /// Stop the tick loop without touching the remaining time
    fn halt(&mut self) {
        if !self.state.is_counting || !self.state.is_running {
            return;
        }
        self.cancel_cycle();
        self.state.is_counting = false;
    }

    /// Restart the tick loop after `halt`, reconciling against the anchor
    fn recover(&mut self) {
        if self.state.is_counting || !self.state.is_running || self.state.is_paused {
            return;
        }
        self.state.is_counting = true;
        self.correct_time();
        self.count();
    }

    fn correct_time(&mut self) {
        if !self.state.is_counting {
            return;
        }
        self.state.remaining_ms = self.state.finish_at_ms.saturating_sub(self.now());
    }

    fn finish(&mut self) {
        if !self.state.is_counting {
            return;
        }
        self.cancel_cycle();
        self.state.is_counting = false;
        self.state.is_running = false;
        self.state.has_ended = true;
        self.state.finish_at_ms = 0;
        debug!("Countdown finished");
        self.emit(EventKind::Finish);
    }

    fn emit(&mut self, kind: EventKind) {
        if !self.options.emit.allows(kind) {
            return;
        }

        let event = CountdownEvent { kind, units: self.units() };
        trace!("Emitting {} at {}ms", kind, event.units.total_milliseconds);
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("cycle", &self.cycle)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
