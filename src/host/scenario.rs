//! Recorded host scenarios.
//!
//! A scenario is a JSON document describing a workspace, the windows that
//! exist before the bridge starts, and a sequence of host events to replay
//! against a [`SimWorkspace`].
//!
//! ```json
//! {
//!   "workspace": {"currentActivity": "a1", "cursorPos": {"x": 0, "y": 0}},
//!   "windows": [{"handle": 1, "properties": {"internalId": "w1", "caption": "Term"}}],
//!   "active": 1,
//!   "events": [
//!     {"type": "cursor", "x": 10, "y": 20},
//!     {"type": "set_property", "window": 1, "property": "caption",
//!      "value": "vim", "signal": "captionChanged"}
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};

use super::HandleId;
use super::sim::{SimWindow, SimWorkspace};

/// A window as it exists on the host.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowSpec {
    /// Live object identity.
    pub handle: u64,
    /// Host properties, as a JSON object.
    #[serde(default)]
    pub properties: Value,
    /// Signals the window supports; all of them when omitted.
    #[serde(default)]
    pub signals: Option<Vec<String>>,
    /// Signals whose connection the host refuses.
    #[serde(default)]
    pub rejecting: Vec<String>,
}

impl WindowSpec {
    fn build(&self) -> Rc<SimWindow> {
        let mut window = SimWindow::new(HandleId(self.handle), self.properties.clone());
        if let Some(signals) = &self.signals {
            window = window.with_signals(signals.iter().cloned());
        }
        if !self.rejecting.is_empty() {
            window = window.rejecting(self.rejecting.iter().cloned());
        }
        Rc::new(window)
    }
}

/// One host event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Change a window property, optionally firing a signal afterwards.
    SetProperty {
        window: u64,
        property: String,
        value: Value,
        #[serde(default)]
        signal: Option<String>,
    },
    /// Fire a window signal without changing anything.
    Signal { window: u64, signal: String },
    /// Create a window.
    AddWindow { window: WindowSpec },
    /// Destroy a window.
    RemoveWindow { window: u64 },
    /// Activate a window, or clear activation when `window` is omitted.
    Activate {
        #[serde(default)]
        window: Option<u64>,
    },
    /// Move the cursor.
    Cursor { x: i64, y: i64 },
    /// Switch the current desktop.
    Desktop { desktop: Value },
    /// Replace the desktop list.
    Desktops { desktops: Value },
    /// Switch activity.
    Activity { id: String },
}

/// A full scenario.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Workspace properties.
    pub workspace: Value,
    /// Windows present before the bridge starts, bottom to top.
    pub windows: Vec<WindowSpec>,
    /// Handle of the initially active window.
    pub active: Option<u64>,
    /// Events replayed after the bridge starts.
    pub events: Vec<Event>,
}

impl Scenario {
    /// Parse a scenario from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid scenario")
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("In {}", path.display()))
    }

    /// Build the initial workspace without firing any signal.
    pub fn build_workspace(&self) -> Rc<SimWorkspace> {
        let workspace = SimWorkspace::new(self.workspace.clone());
        for spec in &self.windows {
            workspace.insert_window(spec.build());
        }
        workspace.set_active(self.active.map(HandleId));
        Rc::new(workspace)
    }

    /// Replay every event in order. Returns how many were applied.
    pub fn run_events(&self, workspace: &SimWorkspace) -> usize {
        self.events
            .iter()
            .filter(|event| apply(workspace, event))
            .count()
    }
}

/// Apply one event. Events naming an unknown window are skipped.
pub fn apply(workspace: &SimWorkspace, event: &Event) -> bool {
    debug!(?event, "Replaying");
    match event {
        Event::SetProperty {
            window,
            property,
            value,
            signal,
        } => {
            let Some(w) = lookup(workspace, *window) else {
                return false;
            };
            w.set_property(property, value.clone());
            if let Some(signal) = signal {
                w.emit(signal);
            }
        }
        Event::Signal { window, signal } => {
            let Some(w) = lookup(workspace, *window) else {
                return false;
            };
            w.emit(signal);
        }
        Event::AddWindow { window } => workspace.add_window(window.build()),
        Event::RemoveWindow { window } => {
            if workspace.remove_window(HandleId(*window)).is_none() {
                warn!(handle = window, "Scenario removes an unknown window");
                return false;
            }
        }
        Event::Activate { window } => {
            if let Some(handle) = window
                && lookup(workspace, *handle).is_none()
            {
                return false;
            }
            workspace.activate(window.map(HandleId));
        }
        Event::Cursor { x, y } => workspace.move_cursor(*x, *y),
        Event::Desktop { desktop } => workspace.switch_desktop(desktop.clone()),
        Event::Desktops { desktops } => workspace.set_desktops(desktops.clone()),
        Event::Activity { id } => workspace.switch_activity(id),
    }
    true
}

fn lookup(workspace: &SimWorkspace, handle: u64) -> Option<Rc<SimWindow>> {
    let window = workspace.window(HandleId(handle));
    if window.is_none() {
        warn!(handle, "Scenario refers to an unknown window");
    }
    window
}
