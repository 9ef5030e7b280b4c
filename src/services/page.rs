//! Host surface notifications: visibility changes and scroll-end events

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError, RwLock,
    },
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Whether the host surface is currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// Registration token returned by `subscribe` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked on a host notification
pub type Listener<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Source of visibility state and change notifications
pub trait VisibilitySource: Send + Sync {
    fn visibility(&self) -> Visibility;
    fn subscribe(&self, listener: Listener<Visibility>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
}

/// Source of scroll-end notifications
pub trait ScrollSource: Send + Sync {
    fn subscribe_scroll_end(&self, listener: Listener<()>) -> ListenerId;
    fn unsubscribe_scroll(&self, id: ListenerId);
}

/// Listener registry that never holds its lock while notifying
struct ListenerSet<T> {
    listeners: Mutex<Vec<(ListenerId, Listener<T>)>>,
}

impl<T: Copy> ListenerSet<T> {
    fn new() -> Self {
        Self { listeners: Mutex::new(Vec::new()) }
    }

    fn add(&self, id: ListenerId, listener: Listener<T>) {
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push((id, listener)),
            Err(e) => warn!("Failed to register listener: {}", e),
        }
    }

    fn remove(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(existing, _)| *existing != id);
        }
    }

    fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn notify(&self, value: T) {
        let snapshot: Vec<Listener<T>> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(e) => {
                warn!("Failed to read listeners: {}", e);
                return;
            }
        };

        for listener in snapshot {
            listener(value);
        }
    }
}

/// In-process host surface driven by whoever embeds the countdown
pub struct HostPage {
    visibility: RwLock<Visibility>,
    /// Held from write through notification so changes are delivered in order
    changes: Mutex<()>,
    next_id: AtomicU64,
    visibility_listeners: ListenerSet<Visibility>,
    scroll_listeners: ListenerSet<()>,
}

impl HostPage {
    /// Create a page with the given initial visibility
    pub fn new(initial: Visibility) -> Self {
        Self {
            visibility: RwLock::new(initial),
            changes: Mutex::new(()),
            next_id: AtomicU64::new(1),
            visibility_listeners: ListenerSet::new(),
            scroll_listeners: ListenerSet::new(),
        }
    }

    /// Change visibility, notifying listeners when it actually changed.
    ///
    /// Returns whether a change happened. Concurrent callers are serialized,
    /// so listeners always finish with the value the page holds. Listeners
    /// must not call back into `set_visibility`.
    pub fn set_visibility(&self, visibility: Visibility) -> bool {
        let _change = self.changes.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = match self.visibility.write() {
            Ok(mut current) => {
                let changed = *current != visibility;
                *current = visibility;
                changed
            }
            Err(e) => {
                warn!("Failed to update visibility: {}", e);
                return false;
            }
        };

        if changed {
            debug!("Host visibility changed to {:?}", visibility);
            self.visibility_listeners.notify(visibility);
        }
        changed
    }

    /// Report that a scroll gesture finished
    pub fn scroll_ended(&self) {
        debug!("Host scroll ended");
        self.scroll_listeners.notify(());
    }

    /// Number of registered visibility and scroll listeners
    pub fn listener_count(&self) -> usize {
        self.visibility_listeners.len() + self.scroll_listeners.len()
    }

    fn next_listener_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for HostPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostPage")
            .field("visibility", &self.visibility())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Default for HostPage {
    fn default() -> Self {
        Self::new(Visibility::Visible)
    }
}

impl VisibilitySource for HostPage {
    fn visibility(&self) -> Visibility {
        self.visibility.read().map(|v| *v).unwrap_or(Visibility::Hidden)
    }

    fn subscribe(&self, listener: Listener<Visibility>) -> ListenerId {
        let id = self.next_listener_id();
        self.visibility_listeners.add(id, listener);
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.visibility_listeners.remove(id);
    }
}

impl ScrollSource for HostPage {
    fn subscribe_scroll_end(&self, listener: Listener<()>) -> ListenerId {
        let id = self.next_listener_id();
        self.scroll_listeners.add(id, listener);
        id
    }

    fn unsubscribe_scroll(&self, id: ListenerId) {
        self.scroll_listeners.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn notifies_only_on_change() {
        let page = HostPage::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        page.subscribe(Arc::new(move |_: Visibility| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(!page.set_visibility(Visibility::Visible));
        assert!(page.set_visibility(Visibility::Hidden));
        assert!(!page.set_visibility(Visibility::Hidden));
        assert_eq!(page.visibility(), Visibility::Hidden);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_removes_listener() {
        let page = HostPage::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = page.subscribe_scroll_end(Arc::new(move |()| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(page.listener_count(), 1);

        page.scroll_ended();
        page.unsubscribe_scroll(id);
        page.scroll_ended();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn listener_may_read_visibility() {
        let page = Arc::new(HostPage::default());
        let observed = Arc::new(Mutex::new(None));
        let (inner, out) = (Arc::clone(&page), Arc::clone(&observed));
        page.subscribe(Arc::new(move |_: Visibility| {
            *out.lock().unwrap() = Some(inner.visibility());
        }));

        page.set_visibility(Visibility::Hidden);
        assert_eq!(*observed.lock().unwrap(), Some(Visibility::Hidden));
    }

    #[test]
    fn concurrent_changes_are_delivered_in_write_order() {
        use std::{sync::mpsc, thread, time::Duration};

        let page = Arc::new(HostPage::default());
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();
        let log = Arc::clone(&delivered);
        page.subscribe(Arc::new(move |visibility: Visibility| {
            if visibility == Visibility::Hidden {
                let _ = entered_tx.send(());
                thread::sleep(Duration::from_millis(50));
            }
            log.lock().unwrap().push(visibility);
        }));

        let hider = {
            let page = Arc::clone(&page);
            thread::spawn(move || page.set_visibility(Visibility::Hidden))
        };
        entered_rx.recv().unwrap();
        assert!(page.set_visibility(Visibility::Visible));
        hider.join().unwrap();

        assert_eq!(page.visibility(), Visibility::Visible);
        assert_eq!(
            *delivered.lock().unwrap(),
            vec![Visibility::Hidden, Visibility::Visible]
        );
    }
}
