//! Dispatcher: turns bridge events into method calls on the IPC endpoint.
//!
//! Delivery is fire-and-forget. A transport either accepts a call or reports
//! an error; the dispatcher logs the error and moves on. Nothing is retried
//! and the caller is never blocked.

mod dbus;
mod print;

pub use dbus::{DbusTransport, DeliveryWorker};
pub use print::PrintTransport;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::DeliveryError;

/// Default well-known name of the bridge service.
pub const DEFAULT_SERVICE: &str = "org.kde.kwin.Scripted";
/// Default object path of the bridge object.
pub const DEFAULT_PATH: &str = "/Bridge";
/// Default interface of the bridge object.
pub const DEFAULT_INTERFACE: &str = "org.kde.kwin.Scripted.Bridge";

/// Where calls are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    /// Bus name of the listener.
    pub service: String,
    /// Object path on the listener.
    pub path: String,
    /// Interface the methods belong to.
    pub interface: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            path: DEFAULT_PATH.to_string(),
            interface: DEFAULT_INTERFACE.to_string(),
        }
    }
}

/// A single positional argument on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallArg {
    Str(String),
    Int(i32),
}

/// One method call on the bridge interface.
///
/// JSON payload arguments are already encoded; the transport sends them as
/// D-Bus strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    UpdateActiveWindow { json: String },
    NotifyCursorMoved { x: i32, y: i32 },
    NotifyDesktopChanged { json: String },
    UpdateDesktopList { json: String },
    NotifyActivityChanged { activity_id: String },
    NotifyGeometryChanged { window_id: String, json: String },
    NotifyWindowPropertyChanged { window_id: String, property: String, json: String },
    NotifyWindowAdded { json: String },
    NotifyWindowRemoved { window_id: String },
    UpdateWindowList { json: String },
}

impl BridgeCall {
    /// D-Bus method name.
    pub fn method(&self) -> &'static str {
        match self {
            BridgeCall::UpdateActiveWindow { .. } => "UpdateActiveWindow",
            BridgeCall::NotifyCursorMoved { .. } => "NotifyCursorMoved",
            BridgeCall::NotifyDesktopChanged { .. } => "NotifyDesktopChanged",
            BridgeCall::UpdateDesktopList { .. } => "UpdateDesktopList",
            BridgeCall::NotifyActivityChanged { .. } => "NotifyActivityChanged",
            BridgeCall::NotifyGeometryChanged { .. } => "NotifyGeometryChanged",
            BridgeCall::NotifyWindowPropertyChanged { .. } => "NotifyWindowPropertyChanged",
            BridgeCall::NotifyWindowAdded { .. } => "NotifyWindowAdded",
            BridgeCall::NotifyWindowRemoved { .. } => "NotifyWindowRemoved",
            BridgeCall::UpdateWindowList { .. } => "UpdateWindowList",
        }
    }

    /// Positional arguments, in wire order.
    pub fn args(&self) -> Vec<CallArg> {
        match self {
            BridgeCall::UpdateActiveWindow { json }
            | BridgeCall::NotifyDesktopChanged { json }
            | BridgeCall::UpdateDesktopList { json }
            | BridgeCall::NotifyWindowAdded { json }
            | BridgeCall::UpdateWindowList { json } => vec![CallArg::Str(json.clone())],
            BridgeCall::NotifyCursorMoved { x, y } => vec![CallArg::Int(*x), CallArg::Int(*y)],
            BridgeCall::NotifyActivityChanged { activity_id } => {
                vec![CallArg::Str(activity_id.clone())]
            }
            BridgeCall::NotifyWindowRemoved { window_id } => vec![CallArg::Str(window_id.clone())],
            BridgeCall::NotifyGeometryChanged { window_id, json } => {
                vec![CallArg::Str(window_id.clone()), CallArg::Str(json.clone())]
            }
            BridgeCall::NotifyWindowPropertyChanged {
                window_id,
                property,
                json,
            } => vec![
                CallArg::Str(window_id.clone()),
                CallArg::Str(property.clone()),
                CallArg::Str(json.clone()),
            ],
        }
    }
}

/// Something that can carry calls to the endpoint.
///
/// `deliver` must not block the caller on the remote side; an `Err` only
/// means this particular call is lost.
pub trait Transport {
    /// Hand one call over for delivery.
    fn deliver(&self, endpoint: &Endpoint, call: BridgeCall) -> Result<(), DeliveryError>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}

/// Sends calls to a fixed endpoint through a transport.
pub struct Dispatcher {
    endpoint: Endpoint,
    transport: Box<dyn Transport>,
}

impl Dispatcher {
    /// Create a dispatcher for the given endpoint.
    pub fn new(endpoint: Endpoint, transport: Box<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    /// The endpoint calls go to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send a call. Failures are logged and dropped.
    pub fn send(&self, call: BridgeCall) {
        let method = call.method();
        trace!(method, transport = self.transport.name(), "Dispatching");
        if let Err(e) = self.transport.deliver(&self.endpoint, call) {
            warn!(method, error = %e, "Failed to deliver bridge call");
        }
    }
}
