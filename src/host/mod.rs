//! Host abstraction for the windowing environment.
//!
//! The bridge never talks to KWin directly. It consumes a workspace and its
//! windows through the traits in this module: loosely typed properties read as
//! JSON values, plus named signals with explicit connect/disconnect. A property
//! may be absent, null or of an unexpected type depending on the host version;
//! the normalizer deals with that.
//!
//! Everything here is single-threaded. Handlers run to completion on the host's
//! event loop, so shared state uses `Rc`/`RefCell` rather than locks.

pub mod scenario;
pub mod sim;

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::error::HostError;

/// Identity of a live host object, stable for as long as the object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Token returned by a successful connect, used to disconnect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// An argument delivered with a signal.
#[derive(Clone)]
pub enum SignalArg {
    /// A window object (windowActivated, windowAdded, windowRemoved).
    Window(Option<WindowRef>),
    /// A plain value (currentActivityChanged carries the activity id).
    Value(Value),
}

impl fmt::Debug for SignalArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalArg::Window(Some(w)) => write!(f, "Window({})", w.handle_id()),
            SignalArg::Window(None) => write!(f, "Window(null)"),
            SignalArg::Value(v) => write!(f, "Value({})", v),
        }
    }
}

/// Callback invoked when a signal fires.
pub type Handler = Rc<dyn Fn(&[SignalArg])>;

/// Shared reference to a host window.
pub type WindowRef = Rc<dyn Window>;

/// Read access to loosely typed host properties.
pub trait PropertySource {
    /// Read a property by name.
    ///
    /// `None` means the property does not exist on this object;
    /// `Some(Value::Null)` means it exists but is null. Callers treat both
    /// the same way.
    fn property(&self, name: &str) -> Option<Value>;
}

/// Objects that expose named signals.
pub trait SignalSource {
    /// Whether the object exposes the named signal at all.
    fn has_signal(&self, signal: &str) -> bool;

    /// Connect a handler to a signal.
    fn connect(&self, signal: &str, handler: Handler) -> Result<ConnectionId, HostError>;

    /// Disconnect a previously connected handler. Unknown ids are ignored.
    fn disconnect(&self, id: ConnectionId);
}

/// A host window.
pub trait Window: PropertySource + SignalSource {
    /// Identity of the live object (not the `internalId` property).
    fn handle_id(&self) -> HandleId;
}

/// The host workspace: global state plus the window set.
///
/// Exposes `cursorPos`, `currentDesktop`, `desktops` and `currentActivity`
/// through [`PropertySource`].
pub trait Workspace: PropertySource + SignalSource {
    /// The currently active window, if any.
    fn active_window(&self) -> Option<WindowRef>;

    /// All windows known to the host, bottom to top.
    fn stacking_order(&self) -> Vec<WindowRef>;
}

impl fmt::Debug for dyn Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window({})", self.handle_id())
    }
}

/// Workspace signal names.
pub mod workspace_signals {
    /// The active window changed; carries the new window (or null).
    pub const WINDOW_ACTIVATED: &str = "windowActivated";
    /// The cursor moved.
    pub const CURSOR_POS_CHANGED: &str = "cursorPosChanged";
    /// The current virtual desktop changed.
    pub const CURRENT_DESKTOP_CHANGED: &str = "currentDesktopChanged";
    /// Desktops were added, removed or renamed.
    pub const DESKTOPS_CHANGED: &str = "desktopsChanged";
    /// The current activity changed; carries the activity id.
    pub const CURRENT_ACTIVITY_CHANGED: &str = "currentActivityChanged";
    /// A window was created; carries the window.
    pub const WINDOW_ADDED: &str = "windowAdded";
    /// A window was destroyed; carries the window.
    pub const WINDOW_REMOVED: &str = "windowRemoved";

    /// Every workspace signal the bridge subscribes to.
    pub const ALL: &[&str] = &[
        WINDOW_ACTIVATED,
        CURSOR_POS_CHANGED,
        CURRENT_DESKTOP_CHANGED,
        DESKTOPS_CHANGED,
        CURRENT_ACTIVITY_CHANGED,
        WINDOW_ADDED,
        WINDOW_REMOVED,
    ];
}

/// Pull the window out of a signal's first argument.
pub fn window_arg(args: &[SignalArg]) -> Option<WindowRef> {
    match args.first() {
        Some(SignalArg::Window(w)) => w.clone(),
        _ => None,
    }
}

/// Pull a plain value out of a signal's first argument.
pub fn value_arg(args: &[SignalArg]) -> Option<&Value> {
    match args.first() {
        Some(SignalArg::Value(v)) => Some(v),
        _ => None,
    }
}
