//! In-memory host used for scenario replay and tests.
//!
//! Properties are stored as JSON values exactly as a script engine would see
//! them, so scenarios can model missing, null and oddly typed fields. Windows
//! can be restricted to a subset of signals, or made to reject some
//! connections, to mimic older host versions.

use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::{
    ConnectionId, HandleId, Handler, PropertySource, SignalArg, SignalSource, Window, WindowRef,
    Workspace, workspace_signals,
};
use crate::error::HostError;

/// Connected handlers of one simulated object.
#[derive(Default)]
struct SignalTable {
    /// `None` means every signal name exists.
    supported: Option<HashSet<String>>,
    rejected: HashSet<String>,
    handlers: RefCell<Vec<(ConnectionId, String, Handler)>>,
    next_id: Cell<u64>,
}

impl SignalTable {
    fn has(&self, signal: &str) -> bool {
        self.supported
            .as_ref()
            .is_none_or(|supported| supported.contains(signal))
    }

    fn connect(&self, signal: &str, handler: Handler) -> Result<ConnectionId, HostError> {
        if !self.has(signal) {
            return Err(HostError::UnknownSignal(signal.to_string()));
        }
        if self.rejected.contains(signal) {
            return Err(HostError::Rejected {
                signal: signal.to_string(),
                reason: "connection refused by host".to_string(),
            });
        }
        let id = ConnectionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .push((id, signal.to_string(), handler));
        Ok(id)
    }

    fn disconnect(&self, id: ConnectionId) {
        self.handlers.borrow_mut().retain(|(cid, _, _)| *cid != id);
    }

    fn emit(&self, signal: &str, args: &[SignalArg]) {
        // Handlers may connect or disconnect while running.
        let handlers: Vec<Handler> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == signal)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(args);
        }
    }

    fn count(&self, signal: &str) -> usize {
        self.handlers
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == signal)
            .count()
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// A simulated window.
pub struct SimWindow {
    handle: HandleId,
    properties: RefCell<Map<String, Value>>,
    signals: SignalTable,
}

impl SimWindow {
    /// Create a window with the given properties (a JSON object).
    pub fn new(handle: HandleId, properties: Value) -> Self {
        Self {
            handle,
            properties: RefCell::new(into_map(properties)),
            signals: SignalTable::default(),
        }
    }

    /// Restrict the window to the named signals.
    pub fn with_signals<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signals.supported = Some(signals.into_iter().map(Into::into).collect());
        self
    }

    /// Make connecting to the named signals fail.
    pub fn rejecting<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signals.rejected = signals.into_iter().map(Into::into).collect();
        self
    }

    /// Set a property without notifying.
    pub fn set_property(&self, name: &str, value: Value) {
        self.properties.borrow_mut().insert(name.to_string(), value);
    }

    /// Remove a property entirely.
    pub fn remove_property(&self, name: &str) {
        self.properties.borrow_mut().remove(name);
    }

    /// Fire a signal with no arguments.
    pub fn emit(&self, signal: &str) {
        self.signals.emit(signal, &[]);
    }

    /// Number of handlers connected to a signal.
    pub fn handler_count(&self, signal: &str) -> usize {
        self.signals.count(signal)
    }

    /// Total number of connected handlers.
    pub fn total_handlers(&self) -> usize {
        self.signals.handlers.borrow().len()
    }
}

impl PropertySource for SimWindow {
    fn property(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }
}

impl SignalSource for SimWindow {
    fn has_signal(&self, signal: &str) -> bool {
        self.signals.has(signal)
    }

    fn connect(&self, signal: &str, handler: Handler) -> Result<ConnectionId, HostError> {
        self.signals.connect(signal, handler)
    }

    fn disconnect(&self, id: ConnectionId) {
        self.signals.disconnect(id);
    }
}

impl Window for SimWindow {
    fn handle_id(&self) -> HandleId {
        self.handle
    }
}

/// A simulated workspace owning a set of windows.
pub struct SimWorkspace {
    properties: RefCell<Map<String, Value>>,
    windows: RefCell<Vec<Rc<SimWindow>>>,
    active: Cell<Option<HandleId>>,
    signals: SignalTable,
}

impl SimWorkspace {
    /// Create a workspace with the given global properties.
    pub fn new(properties: Value) -> Self {
        Self {
            properties: RefCell::new(into_map(properties)),
            windows: RefCell::new(Vec::new()),
            active: Cell::new(None),
            signals: SignalTable::default(),
        }
    }

    /// Place a window without notifying (windows that exist before the bridge starts).
    pub fn insert_window(&self, window: Rc<SimWindow>) {
        self.windows.borrow_mut().push(window);
    }

    /// Look up a window by handle.
    pub fn window(&self, handle: HandleId) -> Option<Rc<SimWindow>> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.handle == handle)
            .cloned()
    }

    /// Mark a window active without notifying.
    pub fn set_active(&self, handle: Option<HandleId>) {
        self.active.set(handle);
    }

    /// Set a workspace property without notifying.
    pub fn set_property(&self, name: &str, value: Value) {
        self.properties.borrow_mut().insert(name.to_string(), value);
    }

    /// Create a window and fire `windowAdded`.
    pub fn add_window(&self, window: Rc<SimWindow>) {
        self.insert_window(Rc::clone(&window));
        let arg: WindowRef = window;
        self.signals.emit(
            workspace_signals::WINDOW_ADDED,
            &[SignalArg::Window(Some(arg))],
        );
    }

    /// Destroy a window and fire `windowRemoved`.
    pub fn remove_window(&self, handle: HandleId) -> Option<Rc<SimWindow>> {
        let window = {
            let mut windows = self.windows.borrow_mut();
            let index = windows.iter().position(|w| w.handle == handle)?;
            windows.remove(index)
        };
        if self.active.get() == Some(handle) {
            self.active.set(None);
        }
        let arg: WindowRef = window.clone();
        self.signals.emit(
            workspace_signals::WINDOW_REMOVED,
            &[SignalArg::Window(Some(arg))],
        );
        Some(window)
    }

    /// Activate a window (or clear activation) and fire `windowActivated`.
    pub fn activate(&self, handle: Option<HandleId>) {
        self.active.set(handle);
        let window = self.active_window();
        self.signals.emit(
            workspace_signals::WINDOW_ACTIVATED,
            &[SignalArg::Window(window)],
        );
    }

    /// Move the cursor and fire `cursorPosChanged`.
    pub fn move_cursor(&self, x: i64, y: i64) {
        self.set_property("cursorPos", serde_json::json!({"x": x, "y": y}));
        self.signals.emit(workspace_signals::CURSOR_POS_CHANGED, &[]);
    }

    /// Switch the current desktop and fire `currentDesktopChanged`.
    pub fn switch_desktop(&self, desktop: Value) {
        self.set_property("currentDesktop", desktop);
        self.signals
            .emit(workspace_signals::CURRENT_DESKTOP_CHANGED, &[]);
    }

    /// Replace the desktop list and fire `desktopsChanged`.
    pub fn set_desktops(&self, desktops: Value) {
        self.set_property("desktops", desktops);
        self.signals.emit(workspace_signals::DESKTOPS_CHANGED, &[]);
    }

    /// Switch activity and fire `currentActivityChanged` with its id.
    pub fn switch_activity(&self, id: &str) {
        self.set_property("currentActivity", Value::String(id.to_string()));
        self.signals.emit(
            workspace_signals::CURRENT_ACTIVITY_CHANGED,
            &[SignalArg::Value(Value::String(id.to_string()))],
        );
    }

    /// Number of handlers connected to a workspace signal.
    pub fn handler_count(&self, signal: &str) -> usize {
        self.signals.count(signal)
    }
}

impl PropertySource for SimWorkspace {
    fn property(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }
}

impl SignalSource for SimWorkspace {
    fn has_signal(&self, signal: &str) -> bool {
        self.signals.has(signal)
    }

    fn connect(&self, signal: &str, handler: Handler) -> Result<ConnectionId, HostError> {
        self.signals.connect(signal, handler)
    }

    fn disconnect(&self, id: ConnectionId) {
        self.signals.disconnect(id);
    }
}

impl Workspace for SimWorkspace {
    fn active_window(&self) -> Option<WindowRef> {
        let handle = self.active.get()?;
        self.window(handle).map(|w| w as WindowRef)
    }

    fn stacking_order(&self) -> Vec<WindowRef> {
        self.windows
            .borrow()
            .iter()
            .map(|w| Rc::clone(w) as WindowRef)
            .collect()
    }
}
