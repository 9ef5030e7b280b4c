//! Frame driver background task

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::{
    countdown::CountdownHandle,
    services::FrameQueue,
};

/// Default frame period, roughly one 60 Hz display refresh
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Background task that releases queued frame requests once per frame period
pub async fn frame_driver_task(countdown: CountdownHandle, queue: FrameQueue, period: Duration) {
    info!("Starting frame driver with {}ms frames", period.as_millis());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        // Requests made while delivering land in the queue for the next tick
        for handle in queue.take_pending() {
            if let Err(e) = countdown.deliver_frame(handle) {
                error!("Failed to deliver frame: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        countdown::{Countdown, CountdownOptions},
        services::{Clock, HostPage, VisibilitySource},
        state::Phase,
    };
    use std::sync::Arc;
    use tokio::time::Instant;

    /// Clock that follows tokio's (pausable) time
    struct TokioClock(Instant);

    impl Clock for TokioClock {
        fn now_ms(&self) -> u64 {
            self.0.elapsed().as_millis() as u64
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drives_countdown_to_finish() {
        let queue = FrameQueue::new();
        let page = Arc::new(HostPage::default());
        let countdown = Countdown::new(
            CountdownOptions::new(3_000).unwrap(),
            Arc::new(TokioClock(Instant::now())),
            Box::new(queue.clone()),
            page as Arc<dyn VisibilitySource>,
        )
        .unwrap();
        let handle = CountdownHandle::new(countdown);
        handle.with(Countdown::start).unwrap();

        let driver = tokio::spawn(frame_driver_task(
            handle.clone(),
            queue,
            Duration::from_millis(DEFAULT_FRAME_MS),
        ));

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(handle.with(|c| c.remaining_ms()).unwrap(), 2_000);

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(handle.with(|c| c.phase()).unwrap(), Phase::Ended);

        driver.abort();
    }
}
