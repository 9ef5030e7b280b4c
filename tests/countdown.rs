//! End-to-end countdown behaviour against deterministic collaborators

use std::sync::{Arc, Mutex};

use countdown_timer::{
    services::{FrameQueue, HostPage, ManualClock, Visibility, VisibilitySource},
    Countdown, CountdownEvent, CountdownHandle, CountdownOptions, EventKind, Phase,
};
use proptest::prelude::*;

struct Harness {
    clock: ManualClock,
    frames: FrameQueue,
    page: Arc<HostPage>,
    events: Arc<Mutex<Vec<CountdownEvent>>>,
    handle: CountdownHandle,
}

impl Harness {
    fn new(options: CountdownOptions) -> Self {
        let clock = ManualClock::new(0);
        let frames = FrameQueue::new();
        let page = Arc::new(HostPage::default());
        let mut countdown = Countdown::new(
            options,
            Arc::new(clock.clone()),
            Box::new(frames.clone()),
            Arc::clone(&page) as Arc<dyn VisibilitySource>,
        )
        .unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        countdown.subscribe(Box::new(move |event: &CountdownEvent| {
            sink.lock().unwrap().push(*event)
        }));

        Self { clock, frames, page, events, handle: CountdownHandle::new(countdown) }
    }

    /// Advance the clock by `gap` and deliver outstanding frames
    fn frame(&self, gap: u64) {
        self.clock.advance(gap);
        for frame in self.frames.take_pending() {
            self.handle.deliver_frame(frame).unwrap();
        }
    }

    fn remaining(&self) -> u64 {
        self.handle.with(|c| c.remaining_ms()).unwrap()
    }

    fn phase(&self) -> Phase {
        self.handle.with(|c| c.phase()).unwrap()
    }

    fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

#[test]
fn five_second_countdown_emits_five_counts_then_finish() {
    let harness = Harness::new(CountdownOptions::new(5_000).unwrap());
    let page = Arc::clone(&harness.page);
    let _attachment = harness.handle.attach(page).unwrap();

    while harness.phase() == Phase::Counting {
        harness.frame(16);
    }

    let events = harness.events.lock().unwrap().clone();
    let seconds: Vec<u64> = events
        .iter()
        .filter(|e| e.kind == EventKind::Count)
        .map(|e| e.units.total_seconds)
        .collect();
    assert_eq!(seconds, vec![4, 3, 2, 1, 0]);
    assert_eq!(events.iter().filter(|e| e.kind == EventKind::Finish).count(), 1);
    assert_eq!(events.last().unwrap().kind, EventKind::Finish);
    assert_eq!(harness.remaining(), 0);
}

#[test]
fn attached_page_drives_visibility_reconciliation() {
    let harness = Harness::new(CountdownOptions::new(10_000).unwrap());
    let page = Arc::clone(&harness.page);
    let attachment = harness.handle.attach(page).unwrap();

    harness.page.set_visibility(Visibility::Hidden);
    harness.clock.advance(4_000);
    harness.page.set_visibility(Visibility::Visible);

    assert_eq!(harness.remaining(), 6_000);
    assert_eq!(harness.phase(), Phase::Counting);
    assert_eq!(
        harness.kinds(),
        vec![EventKind::Start, EventKind::VisibilityHidden, EventKind::VisibilityVisible]
    );

    attachment.detach();
    assert_eq!(harness.page.listener_count(), 0);
}

#[test]
fn background_longer_than_remaining_clamps_to_zero() {
    let harness = Harness::new(CountdownOptions::new(3_000).unwrap());
    let page = Arc::clone(&harness.page);
    let _attachment = harness.handle.attach(page).unwrap();

    harness.page.set_visibility(Visibility::Hidden);
    harness.clock.advance(60_000);
    harness.page.set_visibility(Visibility::Visible);

    assert_eq!(harness.remaining(), 0);
    assert_eq!(harness.phase(), Phase::Ended);
}

#[test]
fn stop_resets_and_ignores_pause_and_continue() {
    let harness = Harness::new(CountdownOptions::new(5_000).unwrap().with_auto_start(false));
    harness.handle.with(Countdown::start).unwrap();
    harness.frame(16);

    harness.handle.with(Countdown::stop).unwrap();
    harness.handle.with(Countdown::pause).unwrap();
    harness.handle.with(Countdown::resume).unwrap();

    assert_eq!(harness.remaining(), 0);
    assert_eq!(harness.kinds(), vec![EventKind::Start, EventKind::End]);
    assert_eq!(harness.frames.pending_count(), 0);
}

#[test]
fn hidden_page_blocks_auto_start() {
    let harness = Harness::new(CountdownOptions::new(5_000).unwrap());
    harness.page.set_visibility(Visibility::Hidden);
    let page = Arc::clone(&harness.page);
    let _attachment = harness.handle.attach(page).unwrap();

    assert_eq!(harness.phase(), Phase::Idle);

    // Becoming visible does not start a countdown that never ran
    harness.page.set_visibility(Visibility::Visible);
    assert_eq!(harness.phase(), Phase::Idle);
}

#[test]
fn scroll_end_reanchors_through_attachment() {
    let options = CountdownOptions::new(8_000).unwrap().with_scroll_fix(true);
    let harness = Harness::new(options);
    let page = Arc::clone(&harness.page);
    let _attachment = harness.handle.attach(page).unwrap();

    // Frames stall without the page being hidden
    harness.clock.advance(3_000);
    harness.page.scroll_ended();

    assert_eq!(harness.remaining(), 5_000);
}

#[test]
fn overlapping_visibility_changes_leave_countdown_running() {
    use std::{sync::mpsc, thread, time::Duration};

    let harness = Harness::new(CountdownOptions::new(10_000).unwrap());

    // A slower listener ahead of the countdown widens the delivery window
    let (entered_tx, entered_rx) = mpsc::channel();
    harness.page.subscribe(Arc::new(move |visibility: Visibility| {
        if visibility == Visibility::Hidden {
            let _ = entered_tx.send(());
            thread::sleep(Duration::from_millis(50));
        }
    }));
    let page = Arc::clone(&harness.page);
    let _attachment = harness.handle.attach(page).unwrap();

    let hider = {
        let page = Arc::clone(&harness.page);
        thread::spawn(move || page.set_visibility(Visibility::Hidden))
    };
    entered_rx.recv().unwrap();
    harness.page.set_visibility(Visibility::Visible);
    hider.join().unwrap();

    assert_eq!(harness.page.visibility(), Visibility::Visible);
    assert_eq!(harness.phase(), Phase::Counting);
    assert_eq!(harness.remaining(), 10_000);
}

proptest! {
    #[test]
    fn prop_remaining_never_increases_and_ends_at_zero(
        duration in 1u64..20_000,
        interval in prop::sample::select(vec![100u64, 250, 500, 1_000]),
        gaps in prop::collection::vec(1u64..48, 1..16),
    ) {
        let options = CountdownOptions::new(duration as i64)
            .unwrap()
            .with_interval(interval)
            .unwrap()
            .with_auto_start(false);
        let harness = Harness::new(options);
        harness.handle.with(Countdown::start).unwrap();

        let mut previous = harness.remaining();
        let mut steps = 0usize;
        while harness.phase() == Phase::Counting {
            harness.frame(gaps[steps % gaps.len()]);
            let now = harness.remaining();
            prop_assert!(now <= previous);
            previous = now;
            steps += 1;
            prop_assert!(steps < 100_000, "countdown did not terminate");
        }

        let events = harness.events.lock().unwrap().clone();
        let finish = events.iter().position(|e| e.kind == EventKind::Finish);
        prop_assert_eq!(finish, Some(events.len() - 1));
        prop_assert_eq!(events[events.len() - 1].units.total_milliseconds, 0);

        let counts: Vec<u64> = events
            .iter()
            .filter(|e| e.kind == EventKind::Count)
            .map(|e| e.units.total_milliseconds)
            .collect();
        prop_assert_eq!(counts.len() as u64, duration.div_ceil(interval));
        prop_assert_eq!(counts.last().copied(), Some(0));
    }

    #[test]
    fn prop_pause_then_continue_keeps_remaining(
        duration in 1_000u64..60_000,
        frames_before in 0usize..200,
    ) {
        let options = CountdownOptions::new(duration as i64).unwrap().with_auto_start(false);
        let harness = Harness::new(options);
        harness.handle.with(Countdown::start).unwrap();
        for _ in 0..frames_before {
            if harness.phase() != Phase::Counting {
                break;
            }
            harness.frame(16);
        }

        let before = harness.remaining();
        harness.handle.with(|c| {
            c.pause();
            c.resume();
        }).unwrap();
        prop_assert_eq!(harness.remaining(), before);
    }

    #[test]
    fn prop_hidden_period_is_subtracted(
        duration in 1u64..120_000,
        background in 0u64..200_000,
    ) {
        let harness = Harness::new(CountdownOptions::new(duration as i64).unwrap());
        let page = Arc::clone(&harness.page);
        let _attachment = harness.handle.attach(page).unwrap();

        harness.page.set_visibility(Visibility::Hidden);
        harness.clock.advance(background);
        harness.page.set_visibility(Visibility::Visible);

        prop_assert_eq!(harness.remaining(), duration.saturating_sub(background));
    }

    #[test]
    fn prop_hidden_mid_cycle_reconciles_against_anchor(
        duration in 3_000u64..60_000,
        frames_before in 1usize..150,
        background in 0u64..90_000,
    ) {
        let harness = Harness::new(CountdownOptions::new(duration as i64).unwrap());
        let page = Arc::clone(&harness.page);
        let _attachment = harness.handle.attach(page).unwrap();

        // Fewer frames than the run needs, so hiding lands mid-run
        let mut elapsed = 0u64;
        for _ in 0..frames_before {
            harness.frame(16);
            elapsed += 16;
        }
        prop_assert_eq!(harness.phase(), Phase::Counting);
        let ticked = harness.remaining();

        harness.page.set_visibility(Visibility::Hidden);
        prop_assert_eq!(harness.remaining(), ticked);
        harness.clock.advance(background);
        harness.page.set_visibility(Visibility::Visible);

        // The anchor set at start wins over whatever the ticks had removed
        let expected = duration.saturating_sub(elapsed + background);
        prop_assert_eq!(harness.remaining(), expected);
        if expected == 0 {
            prop_assert_eq!(harness.phase(), Phase::Ended);
        } else {
            prop_assert_eq!(harness.phase(), Phase::Counting);
        }
    }
}
