//! The event bridge core.
//!
//! [`Bridge::start`] subscribes to the workspace, attaches every window that
//! already exists and sends the initial state. From then on host signals are
//! normalized and forwarded through the dispatcher as they arrive, until the
//! bridge is shut down or dropped.

use serde::Serialize;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::dispatch::{BridgeCall, Dispatcher};
use crate::host::{
    HandleId, Handler, SignalArg, Window, WindowRef, Workspace, value_arg,
    window_arg, workspace_signals,
};
use crate::lifecycle::WindowTracker;
use crate::normalize::{self, FromHost, encode};
use crate::signals::{Emit, Probe, Subscriptions, WINDOW_SIGNALS, subscribe_all};
use crate::throttle::FixedRatioThrottle;

/// State shared by every handler.
struct Shared {
    dispatcher: Dispatcher,
    cursor: FixedRatioThrottle,
    tracker: WindowTracker,
    window_lifecycle: bool,
}

impl Shared {
    fn send_json<T, F>(&self, what: &'static str, value: &T, call: F)
    where
        T: Serialize + ?Sized,
        F: FnOnce(String) -> BridgeCall,
    {
        match encode(what, value) {
            Ok(json) => self.dispatcher.send(call(json)),
            Err(e) => warn!("{}", e),
        }
    }

    fn send_active_window(&self, window: Option<&dyn Window>) {
        let record = window.map(|w| normalize::window_record(w));
        self.send_json("active window", &record, |json| {
            BridgeCall::UpdateActiveWindow { json }
        });
    }

    fn send_cursor(&self, workspace: &dyn Workspace) {
        let pos = normalize::cursor_position(workspace);
        self.dispatcher
            .send(BridgeCall::NotifyCursorMoved { x: pos.x, y: pos.y });
    }

    fn send_current_desktop(&self, workspace: &dyn Workspace) {
        let desktop = normalize::current_desktop(workspace);
        self.send_json("current desktop", &desktop, |json| {
            BridgeCall::NotifyDesktopChanged { json }
        });
    }

    fn send_desktop_list(&self, workspace: &dyn Workspace) {
        let desktops = normalize::desktop_list(workspace);
        self.send_json("desktop list", &desktops, |json| {
            BridgeCall::UpdateDesktopList { json }
        });
    }

    fn send_activity(&self, activity_id: String) {
        self.dispatcher
            .send(BridgeCall::NotifyActivityChanged { activity_id });
    }

    fn send_window_list(&self, workspace: &dyn Workspace) {
        let records: Vec<_> = workspace
            .stacking_order()
            .iter()
            .map(|w| normalize::window_record(&**w))
            .collect();
        self.send_json("window list", &records, |json| {
            BridgeCall::UpdateWindowList { json }
        });
    }

    fn send_window_emits(&self, window: &dyn Window, emits: &[Emit]) {
        let window_id = normalize::window_id(window);
        for emit in emits {
            match *emit {
                Emit::Property { name, field } => {
                    let value = normalize::field_value(window, field);
                    self.send_json("window property", &value, |json| {
                        BridgeCall::NotifyWindowPropertyChanged {
                            window_id: window_id.clone(),
                            property: name.to_string(),
                            json,
                        }
                    });
                }
                Emit::Geometry => {
                    let geometry = normalize::geometry_record(window);
                    self.send_json("geometry", &geometry, |json| {
                        BridgeCall::NotifyGeometryChanged {
                            window_id: window_id.clone(),
                            json,
                        }
                    });
                }
            }
        }
    }
}

/// Handlers for every catalog signal of one window.
fn window_handlers(shared: &Rc<Shared>, window: &WindowRef) -> Vec<(&'static str, Handler)> {
    WINDOW_SIGNALS
        .iter()
        .map(|entry| {
            let shared = Rc::clone(shared);
            let weak: Weak<dyn Window> = Rc::downgrade(window);
            let emits = entry.emits;
            let handler: Handler = Rc::new(move |_: &[SignalArg]| {
                if let Some(window) = weak.upgrade() {
                    shared.send_window_emits(window.as_ref(), emits);
                }
            });
            (entry.signal, handler)
        })
        .collect()
}

fn attach_window(shared: &Rc<Shared>, window: &WindowRef) -> bool {
    shared
        .tracker
        .attach(window, || window_handlers(shared, window))
}

/// Handlers for the workspace signals.
fn workspace_handlers(
    shared: &Rc<Shared>,
    workspace: &Rc<dyn Workspace>,
) -> Vec<(&'static str, Handler)> {
    let weak = Rc::downgrade(workspace);
    let on_workspace = |f: fn(&Rc<Shared>, &dyn Workspace, &[SignalArg])| -> Handler {
        let shared = Rc::clone(shared);
        let weak: Weak<dyn Workspace> = weak.clone();
        Rc::new(move |args: &[SignalArg]| {
            if let Some(workspace) = weak.upgrade() {
                f(&shared, workspace.as_ref(), args);
            }
        })
    };

    vec![
        (
            workspace_signals::WINDOW_ACTIVATED,
            on_workspace(|shared, _, args| {
                let window = window_arg(args);
                shared.send_active_window(window.as_deref());
            }),
        ),
        (
            workspace_signals::CURSOR_POS_CHANGED,
            on_workspace(|shared, workspace, _| {
                if shared.cursor.admit() {
                    shared.send_cursor(workspace);
                }
            }),
        ),
        (
            workspace_signals::CURRENT_DESKTOP_CHANGED,
            on_workspace(|shared, workspace, _| {
                shared.send_current_desktop(workspace);
                shared.send_desktop_list(workspace);
            }),
        ),
        (
            workspace_signals::DESKTOPS_CHANGED,
            on_workspace(|shared, workspace, _| shared.send_desktop_list(workspace)),
        ),
        (
            workspace_signals::CURRENT_ACTIVITY_CHANGED,
            on_workspace(|shared, workspace, args| {
                let id = match value_arg(args) {
                    Some(value) => String::from_host(Some(value)),
                    None => normalize::current_activity(workspace),
                };
                shared.send_activity(id);
            }),
        ),
        (
            workspace_signals::WINDOW_ADDED,
            on_workspace(|shared, _, args| {
                let Some(window) = window_arg(args) else {
                    debug!("windowAdded without a window");
                    return;
                };
                if attach_window(shared, &window) && shared.window_lifecycle {
                    let record = normalize::window_record(&*window);
                    shared.send_json("added window", &record, |json| {
                        BridgeCall::NotifyWindowAdded { json }
                    });
                }
            }),
        ),
        (
            workspace_signals::WINDOW_REMOVED,
            on_workspace(|shared, _, args| {
                let Some(window) = window_arg(args) else {
                    debug!("windowRemoved without a window");
                    return;
                };
                let handle = window.handle_id();
                if !shared.tracker.is_attached(handle) {
                    return;
                }
                if shared.window_lifecycle {
                    shared.dispatcher.send(BridgeCall::NotifyWindowRemoved {
                        window_id: normalize::window_id(&*window),
                    });
                }
                shared.tracker.detach(handle);
            }),
        ),
    ]
}

/// A running bridge.
pub struct Bridge {
    workspace: Rc<dyn Workspace>,
    shared: Rc<Shared>,
    subscriptions: Option<Subscriptions>,
}

impl Bridge {
    /// Subscribe to `workspace`, attach its windows and send the initial state.
    pub fn start(workspace: Rc<dyn Workspace>, dispatcher: Dispatcher, config: &BridgeConfig) -> Self {
        let shared = Rc::new(Shared {
            dispatcher,
            cursor: FixedRatioThrottle::new(config.cursor_throttle),
            tracker: WindowTracker::new(),
            window_lifecycle: config.window_lifecycle,
        });

        let handlers = workspace_handlers(&shared, &workspace);
        let subscriptions = subscribe_all(&*workspace, handlers);
        for window in workspace.stacking_order() {
            attach_window(&shared, &window);
        }
        info!(
            windows = shared.tracker.len(),
            workspace_signals = subscriptions.connected_count(),
            endpoint = %shared.dispatcher.endpoint().service,
            "Bridge started"
        );

        let bridge = Self {
            workspace,
            shared,
            subscriptions: Some(subscriptions),
        };
        bridge.send_initial_state();
        bridge
    }

    /// The startup snapshot. Bypasses the cursor throttle.
    fn send_initial_state(&self) {
        let workspace = self.workspace.as_ref();
        let shared = &self.shared;

        if shared.window_lifecycle {
            shared.send_window_list(workspace);
        }
        if let Some(active) = workspace.active_window() {
            shared.send_active_window(Some(active.as_ref()));
        }
        shared.send_current_desktop(workspace);
        shared.send_desktop_list(workspace);
        shared.send_activity(normalize::current_activity(workspace));
        shared.send_cursor(workspace);
    }

    /// Whether a window currently has subscriptions.
    pub fn is_attached(&self, handle: HandleId) -> bool {
        self.shared.tracker.is_attached(handle)
    }

    /// Number of attached windows.
    pub fn attached_count(&self) -> usize {
        self.shared.tracker.len()
    }

    /// Capability probes of an attached window.
    pub fn window_probes(&self, handle: HandleId) -> Option<Vec<Probe>> {
        self.shared.tracker.probes(handle)
    }

    /// Capability probes of the workspace subscriptions.
    pub fn workspace_probes(&self) -> &[Probe] {
        self.subscriptions
            .as_ref()
            .map(Subscriptions::probes)
            .unwrap_or_default()
    }

    /// Disconnect from the workspace and every window. Safe to call twice.
    pub fn shutdown(&mut self) {
        let Some(subscriptions) = self.subscriptions.take() else {
            return;
        };
        subscriptions.release(&*self.workspace);
        self.shared.tracker.detach_all();
        info!("Bridge stopped");
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Endpoint;
    use crate::host::sim::{SimWindow, SimWorkspace};
    use crate::test_utils::{FailingTransport, RecordingTransport, term_window};
    use serde_json::{Value, json};

    fn start(workspace: &Rc<SimWorkspace>, config: &BridgeConfig) -> (Bridge, RecordingTransport) {
        let transport = RecordingTransport::default();
        let dispatcher = Dispatcher::new(Endpoint::default(), Box::new(transport.clone()));
        let bridge = Bridge::start(workspace.clone(), dispatcher, config);
        (bridge, transport)
    }

    fn no_lifecycle() -> BridgeConfig {
        BridgeConfig {
            window_lifecycle: false,
            ..BridgeConfig::default()
        }
    }

    fn json_arg(call: &BridgeCall) -> Value {
        let json = match call {
            BridgeCall::UpdateActiveWindow { json }
            | BridgeCall::NotifyDesktopChanged { json }
            | BridgeCall::UpdateDesktopList { json }
            | BridgeCall::NotifyGeometryChanged { json, .. }
            | BridgeCall::NotifyWindowPropertyChanged { json, .. }
            | BridgeCall::NotifyWindowAdded { json }
            | BridgeCall::UpdateWindowList { json } => json,
            other => panic!("{} has no JSON argument", other.method()),
        };
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_startup_snapshot() {
        let workspace = Rc::new(SimWorkspace::new(json!({
            "cursorPos": {"x": 4, "y": 8},
            "currentDesktop": {"id": "d1", "name": "One", "x11DesktopNumber": 1},
            "desktops": [{"id": "d1", "name": "One", "x11DesktopNumber": 1}],
            "currentActivity": "act",
        })));
        workspace.insert_window(term_window("w1"));
        workspace.set_active(Some(HandleId(1)));

        let (_bridge, transport) = start(&workspace, &BridgeConfig::default());
        assert_eq!(
            transport.methods(),
            vec![
                "UpdateWindowList",
                "UpdateActiveWindow",
                "NotifyDesktopChanged",
                "UpdateDesktopList",
                "NotifyActivityChanged",
                "NotifyCursorMoved",
            ]
        );
        let calls = transport.calls();
        assert_eq!(json_arg(&calls[0]).as_array().unwrap().len(), 1);
        assert_eq!(json_arg(&calls[2])["name"], "One");
        assert_eq!(
            calls[4],
            BridgeCall::NotifyActivityChanged {
                activity_id: "act".to_string()
            }
        );
        assert_eq!(calls[5], BridgeCall::NotifyCursorMoved { x: 4, y: 8 });
    }

    #[test]
    fn test_startup_without_active_window_or_desktop() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let (_bridge, transport) = start(&workspace, &no_lifecycle());

        assert_eq!(
            transport.methods(),
            vec![
                "NotifyDesktopChanged",
                "UpdateDesktopList",
                "NotifyActivityChanged",
                "NotifyCursorMoved",
            ]
        );
        let calls = transport.calls();
        assert_eq!(
            calls[0],
            BridgeCall::NotifyDesktopChanged {
                json: "null".to_string()
            }
        );
        assert_eq!(
            calls[1],
            BridgeCall::UpdateDesktopList {
                json: "[]".to_string()
            }
        );
    }

    #[test]
    fn test_cursor_throttle() {
        let workspace = Rc::new(SimWorkspace::new(json!({"cursorPos": {"x": 0, "y": 0}})));
        let (_bridge, transport) = start(&workspace, &no_lifecycle());

        for i in 1..=10 {
            workspace.move_cursor(i, i * 10);
        }

        let cursor: Vec<BridgeCall> = transport
            .calls()
            .into_iter()
            .filter(|c| matches!(c, BridgeCall::NotifyCursorMoved { .. }))
            .collect();
        assert_eq!(
            cursor,
            vec![
                BridgeCall::NotifyCursorMoved { x: 0, y: 0 },
                BridgeCall::NotifyCursorMoved { x: 3, y: 30 },
                BridgeCall::NotifyCursorMoved { x: 6, y: 60 },
                BridgeCall::NotifyCursorMoved { x: 9, y: 90 },
            ]
        );
    }

    #[test]
    fn test_maximize_emits_once_with_both_fields() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let window = term_window("w1");
        workspace.insert_window(window.clone());
        let (_bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        window.set_property("maximizedHorizontally", json!(true));
        window.set_property("maximizedVertically", json!(true));
        window.emit("maximizedChanged");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            BridgeCall::NotifyWindowPropertyChanged {
                window_id,
                property,
                json,
            } => {
                assert_eq!(window_id, "w1");
                assert_eq!(property, "maximized");
                assert_eq!(json, r#"{"horizontally":true,"vertically":true}"#);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_activation_end_to_end() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        workspace.insert_window(term_window("w1"));
        let (_bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        workspace.activate(Some(HandleId(1)));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let BridgeCall::UpdateActiveWindow { json } = &calls[0] else {
            panic!("unexpected call {:?}", calls[0]);
        };
        assert!(json.contains(r#""caption":"Term""#));
        assert!(json.contains(r#""output":"""#));
        assert!(json.contains(r#""width":800"#));
    }

    #[test]
    fn test_deactivation_sends_null() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let (_bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        workspace.activate(None);
        assert_eq!(
            transport.calls(),
            vec![BridgeCall::UpdateActiveWindow {
                json: "null".to_string()
            }]
        );
    }

    #[test]
    fn test_window_added_twice_attaches_once() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let (bridge, transport) = start(&workspace, &BridgeConfig::default());
        let window = term_window("w1");

        workspace.add_window(window.clone());
        workspace.add_window(window.clone());
        assert_eq!(bridge.attached_count(), 1);
        assert_eq!(window.handler_count("captionChanged"), 1);
        transport.clear();

        window.emit("captionChanged");
        assert_eq!(transport.methods(), vec!["NotifyWindowPropertyChanged"]);
    }

    #[test]
    fn test_missing_signal_does_not_block_others() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let window = Rc::new(
            SimWindow::new(HandleId(5), json!({"internalId": "old", "caption": "Legacy"}))
                .with_signals(["captionChanged", "frameGeometryChanged"])
                .rejecting(["frameGeometryChanged"]),
        );
        workspace.insert_window(window.clone());
        let (bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        let probes = bridge.window_probes(HandleId(5)).unwrap();
        assert_eq!(probes.len(), WINDOW_SIGNALS.len());
        assert_eq!(probes.iter().filter(|p| p.connected).count(), 1);

        window.emit("captionChanged");
        window.emit("frameGeometryChanged");
        assert_eq!(
            transport.calls(),
            vec![BridgeCall::NotifyWindowPropertyChanged {
                window_id: "old".to_string(),
                property: "caption".to_string(),
                json: "\"Legacy\"".to_string(),
            }]
        );
    }

    #[test]
    fn test_add_and_remove_window() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let (bridge, transport) = start(&workspace, &BridgeConfig::default());
        transport.clear();

        let window = term_window("w1");
        workspace.add_window(window.clone());
        assert!(bridge.is_attached(HandleId(1)));

        workspace.remove_window(HandleId(1));
        assert!(!bridge.is_attached(HandleId(1)));
        assert_eq!(window.total_handlers(), 0);

        window.emit("captionChanged");
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(json_arg(&calls[0])["internalId"], "w1");
        assert_eq!(
            calls[1],
            BridgeCall::NotifyWindowRemoved {
                window_id: "w1".to_string()
            }
        );
    }

    #[test]
    fn test_lifecycle_notifications_disabled() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let (bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        workspace.add_window(term_window("w1"));
        assert!(bridge.is_attached(HandleId(1)));
        workspace.remove_window(HandleId(1));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_move_resize_finished() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let window = term_window("w1");
        workspace.insert_window(window.clone());
        let (_bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        window.emit("interactiveMoveResizeStarted");
        window.set_property("frameGeometry", json!({"x": 50, "y": 60, "width": 640, "height": 480}));
        window.emit("interactiveMoveResizeFinished");

        let calls = transport.calls();
        assert_eq!(
            transport.methods(),
            vec![
                "NotifyWindowPropertyChanged",
                "NotifyWindowPropertyChanged",
                "NotifyGeometryChanged",
            ]
        );
        assert_eq!(json_arg(&calls[0]), json!(true));
        assert_eq!(json_arg(&calls[1]), json!(false));
        let geometry = json_arg(&calls[2]);
        assert_eq!(geometry["x"], 50);
        assert_eq!(geometry["width"], 640);
        assert_eq!(geometry["bufferWidth"], 0);
    }

    #[test]
    fn test_activity_uses_signal_argument() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let (_bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        workspace.switch_activity("focus");
        assert_eq!(
            transport.calls(),
            vec![BridgeCall::NotifyActivityChanged {
                activity_id: "focus".to_string()
            }]
        );
    }

    #[test]
    fn test_desktop_events() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let (_bridge, transport) = start(&workspace, &no_lifecycle());
        transport.clear();

        workspace.switch_desktop(json!({"id": "d2", "name": "Two", "x11DesktopNumber": 2}));
        assert_eq!(
            transport.methods(),
            vec!["NotifyDesktopChanged", "UpdateDesktopList"]
        );
        let calls = transport.calls();
        assert_eq!(json_arg(&calls[0])["x11DesktopNumber"], 2);
        transport.clear();

        workspace.set_desktops(json!([{"id": "d1"}, {"id": "d2", "name": "Two"}]));
        assert_eq!(transport.methods(), vec!["UpdateDesktopList"]);
        let list = json_arg(&transport.calls()[0]);
        assert_eq!(list[0], json!({"id": "d1", "name": "", "x11DesktopNumber": 0}));
        assert_eq!(list.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_failing_transport_keeps_bridge_running() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let window = term_window("w1");
        workspace.insert_window(window.clone());
        let transport = FailingTransport::default();
        let dispatcher = Dispatcher::new(Endpoint::default(), Box::new(transport.clone()));
        let _bridge = Bridge::start(workspace.clone(), dispatcher, &no_lifecycle());
        let after_start = transport.attempts();

        window.emit("captionChanged");
        workspace.activate(Some(HandleId(1)));
        assert_eq!(transport.attempts(), after_start + 2);
    }

    #[test]
    fn test_shutdown_disconnects_everything() {
        let workspace = Rc::new(SimWorkspace::new(json!({})));
        let window = term_window("w1");
        workspace.insert_window(window.clone());
        let (mut bridge, transport) = start(&workspace, &no_lifecycle());
        assert!(workspace.handler_count(workspace_signals::CURSOR_POS_CHANGED) > 0);

        bridge.shutdown();
        bridge.shutdown();
        transport.clear();

        assert_eq!(window.total_handlers(), 0);
        assert_eq!(workspace.handler_count(workspace_signals::CURSOR_POS_CHANGED), 0);
        workspace.move_cursor(1, 1);
        window.emit("captionChanged");
        assert!(transport.calls().is_empty());
    }
}
