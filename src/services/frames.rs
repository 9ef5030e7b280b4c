//! Frame scheduling primitive used as the countdown tick source

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::error;

/// Identifies one outstanding frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameHandle(pub u64);

/// A "call me before the next paint" scheduler.
///
/// Each request yields exactly one callback, delivered by the host through
/// [`Countdown::on_frame`](crate::countdown::Countdown::on_frame) with the
/// returned handle, unless it was cancelled first. No timing guarantee is
/// made beyond roughly once per frame.
pub trait FrameScheduler: Send {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    pending: Vec<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// Frame requests waiting to be released by whoever drives frames.
///
/// Clones share one queue, so the driver (or a test) keeps a clone while
/// the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    inner: Arc<Mutex<QueueState>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain requests made since the previous frame, oldest first
    pub fn take_pending(&self) -> Vec<FrameHandle> {
        match self.inner.lock() {
            Ok(mut queue) => std::mem::take(&mut queue.pending),
            Err(e) => {
                error!("Failed to lock frame queue: {}", e);
                Vec::new()
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().map(|q| q.pending.len()).unwrap_or(0)
    }

    /// Total requests and cancellations seen so far
    pub fn stats(&self) -> (u64, u64) {
        self.inner
            .lock()
            .map(|q| (q.requested, q.cancelled))
            .unwrap_or((0, 0))
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let Ok(mut queue) = self.inner.lock() else {
            return FrameHandle(0);
        };
        queue.next_id += 1;
        queue.requested += 1;
        let handle = FrameHandle(queue.next_id);
        queue.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Ok(mut queue) = self.inner.lock() {
            let before = queue.pending.len();
            queue.pending.retain(|pending| *pending != handle);
            if queue.pending.len() != before {
                queue.cancelled += 1;
            }
        }
    }
}
