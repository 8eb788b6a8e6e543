//! D-Bus transport.
//!
//! Calls are queued on a channel and sent by a background task, so the host
//! thread never waits on the bus. Every method is sent without asking for a
//! reply.

use tracing::{debug, info, warn};
use zbus::{Connection, proxy};

use super::{BridgeCall, Endpoint, Transport};
use crate::error::DeliveryError;

/// Proxy for the bridge listener.
#[proxy(
    interface = "org.kde.kwin.Scripted.Bridge",
    default_service = "org.kde.kwin.Scripted",
    default_path = "/Bridge"
)]
trait ScriptedBridge {
    #[zbus(no_reply)]
    fn update_active_window(&self, json: &str) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn notify_cursor_moved(&self, x: i32, y: i32) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn notify_desktop_changed(&self, json: &str) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn update_desktop_list(&self, json: &str) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn notify_activity_changed(&self, activity_id: &str) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn notify_geometry_changed(&self, window_id: &str, json: &str) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn notify_window_property_changed(
        &self,
        window_id: &str,
        property: &str,
        json: &str,
    ) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn notify_window_added(&self, json: &str) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn notify_window_removed(&self, window_id: &str) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn update_window_list(&self, json: &str) -> zbus::Result<()>;
}

/// Queues calls for the delivery task.
pub struct DbusTransport {
    tx: flume::Sender<BridgeCall>,
}

/// Handle to the background delivery task.
pub struct DeliveryWorker {
    task: tokio::task::JoinHandle<usize>,
}

impl DbusTransport {
    /// Connect to the session bus and start the delivery task.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn connect(endpoint: &Endpoint) -> Result<(Self, DeliveryWorker), DeliveryError> {
        let conn = Connection::session().await?;
        let proxy = ScriptedBridgeProxy::builder(&conn)
            .destination(endpoint.service.clone())?
            .path(endpoint.path.clone())?
            .interface(endpoint.interface.clone())?
            .cache_properties(zbus::proxy::CacheProperties::No)
            .build()
            .await?;
        info!(
            service = %endpoint.service,
            path = %endpoint.path,
            "Connected to session bus"
        );

        let (tx, rx) = flume::unbounded();
        let task = tokio::spawn(run_delivery_loop(proxy, rx));
        Ok((Self { tx }, DeliveryWorker { task }))
    }
}

impl Transport for DbusTransport {
    fn deliver(&self, _endpoint: &Endpoint, call: BridgeCall) -> Result<(), DeliveryError> {
        self.tx.send(call).map_err(|_| DeliveryError::QueueClosed)
    }

    fn name(&self) -> &'static str {
        "dbus"
    }
}

impl DeliveryWorker {
    /// Wait until every queued call has been sent.
    ///
    /// The task exits once all transports feeding it are dropped, so drop the
    /// bridge (and with it the dispatcher) before awaiting this.
    pub async fn finish(self) {
        match self.task.await {
            Ok(sent) => debug!(sent, "Delivery task finished"),
            Err(e) => warn!("Delivery task failed: {}", e),
        }
    }
}

/// Drain the queue until every sender is gone. Returns the number of calls
/// handed to the bus.
async fn run_delivery_loop(
    proxy: ScriptedBridgeProxy<'static>,
    rx: flume::Receiver<BridgeCall>,
) -> usize {
    let mut sent = 0;
    while let Ok(call) = rx.recv_async().await {
        let method = call.method();
        match send_call(&proxy, call).await {
            Ok(()) => sent += 1,
            Err(e) => warn!(method, "D-Bus call failed: {}", e),
        }
    }
    debug!("Delivery queue closed, exiting");
    sent
}

async fn send_call(proxy: &ScriptedBridgeProxy<'static>, call: BridgeCall) -> zbus::Result<()> {
    match call {
        BridgeCall::UpdateActiveWindow { json } => proxy.update_active_window(&json).await,
        BridgeCall::NotifyCursorMoved { x, y } => proxy.notify_cursor_moved(x, y).await,
        BridgeCall::NotifyDesktopChanged { json } => proxy.notify_desktop_changed(&json).await,
        BridgeCall::UpdateDesktopList { json } => proxy.update_desktop_list(&json).await,
        BridgeCall::NotifyActivityChanged { activity_id } => {
            proxy.notify_activity_changed(&activity_id).await
        }
        BridgeCall::NotifyGeometryChanged { window_id, json } => {
            proxy.notify_geometry_changed(&window_id, &json).await
        }
        BridgeCall::NotifyWindowPropertyChanged {
            window_id,
            property,
            json,
        } => {
            proxy
                .notify_window_property_changed(&window_id, &property, &json)
                .await
        }
        BridgeCall::NotifyWindowAdded { json } => proxy.notify_window_added(&json).await,
        BridgeCall::NotifyWindowRemoved { window_id } => {
            proxy.notify_window_removed(&window_id).await
        }
        BridgeCall::UpdateWindowList { json } => proxy.update_window_list(&json).await,
    }
}
