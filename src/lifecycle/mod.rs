//! Window lifecycle tracking.
//!
//! A window is unattached until it is seen (present at startup or announced
//! by `windowAdded`), attached while it lives, and detached for good once the
//! host removes it. The tracker owns the connection ids made for each window
//! and hands them back to the host on detach.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::debug;

use crate::host::{HandleId, Handler, Window, WindowRef};
use crate::signals::{Probe, Subscriptions, subscribe_all};

struct Attachment {
    window: Weak<dyn Window>,
    subscriptions: Subscriptions,
}

/// Attached windows and their subscriptions.
#[derive(Default)]
pub struct WindowTracker {
    attached: RefCell<HashMap<HandleId, Attachment>>,
}

impl WindowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe the handlers built by `handlers` to `window`.
    ///
    /// Returns `false` without subscribing anything when the window is
    /// already attached.
    pub fn attach<F>(&self, window: &WindowRef, handlers: F) -> bool
    where
        F: FnOnce() -> Vec<(&'static str, Handler)>,
    {
        self.prune();
        let handle = window.handle_id();
        if self.is_attached(handle) {
            debug!(window = %handle, "Already attached");
            return false;
        }

        let subscriptions = subscribe_all(&**window, handlers());
        let missing: Vec<&str> = subscriptions.missing().collect();
        debug!(
            window = %handle,
            connected = subscriptions.connected_count(),
            missing = ?missing,
            "Attached window"
        );

        self.attached.borrow_mut().insert(
            handle,
            Attachment {
                window: Rc::downgrade(window),
                subscriptions,
            },
        );
        true
    }

    /// Release the subscriptions of a window. Returns `false` if it was not
    /// attached.
    pub fn detach(&self, handle: HandleId) -> bool {
        let Some(attachment) = self.attached.borrow_mut().remove(&handle) else {
            return false;
        };
        release(handle, attachment);
        true
    }

    /// Detach every window.
    pub fn detach_all(&self) {
        let attached: Vec<_> = self.attached.borrow_mut().drain().collect();
        for (handle, attachment) in attached {
            release(handle, attachment);
        }
    }

    /// Forget windows the host dropped without a `windowRemoved`.
    fn prune(&self) {
        self.attached.borrow_mut().retain(|handle, attachment| {
            let live = attachment.window.strong_count() > 0;
            if !live {
                debug!(window = %handle, "Window gone without removal");
            }
            live
        });
    }

    pub fn is_attached(&self, handle: HandleId) -> bool {
        self.attached.borrow().contains_key(&handle)
    }

    /// Capability probes recorded when the window was attached.
    pub fn probes(&self, handle: HandleId) -> Option<Vec<Probe>> {
        self.attached
            .borrow()
            .get(&handle)
            .map(|a| a.subscriptions.probes().to_vec())
    }

    pub fn len(&self) -> usize {
        self.attached.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn release(handle: HandleId, attachment: Attachment) {
    match attachment.window.upgrade() {
        Some(window) => {
            attachment.subscriptions.release(&*window);
            debug!(window = %handle, "Detached window");
        }
        // The host already dropped the object along with its connections.
        None => debug!(window = %handle, "Window gone before detach"),
    }
}
