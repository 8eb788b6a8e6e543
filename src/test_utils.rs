//! Test utilities and mock factories.
//!
//! This module provides common testing utilities including mock host objects
//! and recording transports. Only compiled in test builds.

use serde_json::{Map, Value, json};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dispatch::{BridgeCall, Endpoint, Transport};
use crate::error::DeliveryError;
use crate::host::sim::SimWindow;
use crate::host::{HandleId, PropertySource};

/// A bare property bag.
pub struct Props(Map<String, Value>);

impl PropertySource for Props {
    fn property(&self, name: &str) -> Option<Value> {
        self.0.get(name).cloned()
    }
}

/// Create a property source from a JSON object.
pub fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => Props(map),
        _ => Props(Map::new()),
    }
}

/// Create a mock window with handle 1: caption "Term", an 800x600 frame and
/// no output.
pub fn term_window(internal_id: &str) -> Rc<SimWindow> {
    Rc::new(SimWindow::new(
        HandleId(1),
        json!({
            "internalId": internal_id,
            "caption": "Term",
            "resourceClass": "konsole",
            "frameGeometry": {"x": 0, "y": 0, "width": 800, "height": 600},
        }),
    ))
}

/// Transport that keeps every call in memory.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    calls: Rc<RefCell<Vec<BridgeCall>>>,
}

impl RecordingTransport {
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.borrow().clone()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(BridgeCall::method).collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Transport for RecordingTransport {
    fn deliver(&self, _endpoint: &Endpoint, call: BridgeCall) -> Result<(), DeliveryError> {
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Transport that rejects every call, counting attempts.
#[derive(Clone, Default)]
pub struct FailingTransport {
    attempts: Rc<Cell<usize>>,
}

impl FailingTransport {
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl Transport for FailingTransport {
    fn deliver(&self, _endpoint: &Endpoint, _call: BridgeCall) -> Result<(), DeliveryError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(DeliveryError::QueueClosed)
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props_factory() {
        let p = props(json!({"caption": "x", "tile": null}));
        assert_eq!(p.property("caption"), Some(json!("x")));
        assert_eq!(p.property("tile"), Some(Value::Null));
        assert_eq!(p.property("pid"), None);
        assert_eq!(props(json!(3)).property("caption"), None);
    }

    #[test]
    fn test_term_window_factory() {
        let window = term_window("w9");
        assert_eq!(window.property("internalId"), Some(json!("w9")));
        assert_eq!(window.property("output"), None);
    }

    #[test]
    fn test_recording_transport_shares_state() {
        let transport = RecordingTransport::default();
        let clone = transport.clone();
        clone
            .deliver(&Endpoint::default(), BridgeCall::NotifyCursorMoved { x: 1, y: 1 })
            .unwrap();
        assert_eq!(transport.methods(), vec!["NotifyCursorMoved"]);
        transport.clear();
        assert!(clone.calls().is_empty());
    }
}
