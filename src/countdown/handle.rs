//! Shared countdown handle and host listener attachment

use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, warn};

use super::Countdown;
use crate::{
    error::CountdownError,
    services::{FrameHandle, Listener, ListenerId, ScrollSource, Visibility, VisibilitySource},
};

/// Cloneable, lockable reference to one countdown
#[derive(Debug, Clone)]
pub struct CountdownHandle {
    inner: Arc<Mutex<Countdown>>,
}

impl CountdownHandle {
    pub fn new(countdown: Countdown) -> Self {
        Self { inner: Arc::new(Mutex::new(countdown)) }
    }

    /// Run `f` with the countdown locked
    pub fn with<R>(&self, f: impl FnOnce(&mut Countdown) -> R) -> Result<R, CountdownError> {
        let mut countdown = self
            .inner
            .lock()
            .map_err(|e| CountdownError::LockPoisoned(e.to_string()))?;
        Ok(f(&mut *countdown))
    }

    /// Deliver a frame callback requested by the engine
    pub fn deliver_frame(&self, handle: FrameHandle) -> Result<(), CountdownError> {
        self.with(|countdown| countdown.on_frame(handle))
    }

    /// Bind host listeners, then apply auto-start.
    ///
    /// Visibility changes come from the source the countdown reads when
    /// starting. The scroll listener is only registered when the scroll fix
    /// is enabled. Listeners hold a weak reference, so an attachment never keeps the
    /// countdown alive on its own.
    pub fn attach(&self, scroll: Arc<dyn ScrollSource>) -> Result<Attachment, CountdownError> {
        let (visibility, scroll_fix) = self.with(|countdown| {
            (countdown.visibility_source(), countdown.options().scroll_fix)
        })?;

        let weak = Arc::downgrade(&self.inner);
        let on_visibility: Listener<Visibility> = Arc::new(move |visibility: Visibility| {
            forward(&weak, |countdown| countdown.handle_visibility_change(visibility));
        });
        let visibility_id = visibility.subscribe(on_visibility);

        let scroll = if scroll_fix {
            let weak = Arc::downgrade(&self.inner);
            let on_scroll: Listener<()> = Arc::new(move |()| {
                forward(&weak, Countdown::handle_scroll_end);
            });
            let id = scroll.subscribe_scroll_end(on_scroll);
            Some((scroll, id))
        } else {
            None
        };

        debug!("Countdown attached to host (scroll fix: {})", scroll_fix);
        let attachment = Attachment {
            visibility,
            visibility_id,
            scroll,
            released: false,
        };

        self.with(Countdown::auto_start)?;
        Ok(attachment)
    }
}

fn forward(weak: &Weak<Mutex<Countdown>>, f: impl FnOnce(&mut Countdown)) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    match inner.lock() {
        Ok(mut countdown) => f(&mut *countdown),
        Err(e) => warn!("Dropping host notification, countdown lock poisoned: {}", e),
    };
}

/// Listener registrations owned by an attached countdown.
///
/// Dropping it removes every listener, so early returns and panics unwind
/// cleanly.
pub struct Attachment {
    visibility: Arc<dyn VisibilitySource>,
    visibility_id: ListenerId,
    scroll: Option<(Arc<dyn ScrollSource>, ListenerId)>,
    released: bool,
}

impl Attachment {
    /// Remove the host listeners now
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.visibility.unsubscribe(self.visibility_id);
        if let Some((scroll, id)) = self.scroll.take() {
            scroll.unsubscribe_scroll(id);
        }
        debug!("Countdown detached from host");
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.release();
    }
}
