//! Signal registry: defensive subscription against a partially capable host.
//!
//! Every subscription attempt is independent. A signal missing on the object,
//! or a connect call that fails, is recorded as a failed probe and logged at
//! debug level; the remaining signals still get connected and nothing is
//! returned to the caller as an error.

pub mod catalog;

use tracing::debug;

use crate::host::{ConnectionId, Handler, SignalSource};

pub use catalog::{Emit, WINDOW_SIGNALS, WindowSignal};

/// Outcome of one (object, signal) subscription attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Signal name.
    pub signal: &'static str,
    /// Whether the handler is now connected.
    pub connected: bool,
}

/// Connections made on one object, plus the probe for every attempt.
#[derive(Debug, Default)]
pub struct Subscriptions {
    connections: Vec<(&'static str, ConnectionId)>,
    probes: Vec<Probe>,
}

impl Subscriptions {
    /// Try to connect `handler` to `signal`, recording the outcome.
    pub fn subscribe(
        &mut self,
        source: &(impl SignalSource + ?Sized),
        signal: &'static str,
        handler: Handler,
    ) {
        let connected = match try_connect(source, signal, handler) {
            Some(id) => {
                self.connections.push((signal, id));
                true
            }
            None => false,
        };
        self.probes.push(Probe { signal, connected });
    }

    /// Probe results in subscription order.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Number of live connections.
    pub fn connected_count(&self) -> usize {
        self.connections.len()
    }

    /// Names of signals that could not be connected.
    pub fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.probes.iter().filter(|p| !p.connected).map(|p| p.signal)
    }

    /// Disconnect everything that was connected. Failed probes have nothing
    /// to release.
    pub fn release(self, source: &(impl SignalSource + ?Sized)) {
        for (signal, id) in self.connections {
            debug!(signal, "Disconnecting");
            source.disconnect(id);
        }
    }
}

/// Subscribe a batch of handlers to one object.
pub fn subscribe_all(
    source: &(impl SignalSource + ?Sized),
    handlers: impl IntoIterator<Item = (&'static str, Handler)>,
) -> Subscriptions {
    let mut subscriptions = Subscriptions::default();
    for (signal, handler) in handlers {
        subscriptions.subscribe(source, signal, handler);
    }
    subscriptions
}

fn try_connect(
    source: &(impl SignalSource + ?Sized),
    signal: &'static str,
    handler: Handler,
) -> Option<ConnectionId> {
    if !source.has_signal(signal) {
        debug!(signal, "Signal not available on this host, skipping");
        return None;
    }
    match source.connect(signal, handler) {
        Ok(id) => Some(id),
        Err(e) => {
            debug!(signal, error = %e, "Failed to connect signal, skipping");
            None
        }
    }
}
