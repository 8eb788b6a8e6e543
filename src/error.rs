//! Domain-specific error types for kwin-bridge.
//!
//! None of these are fatal to the bridge: host and delivery errors are logged
//! where they occur and the bridge keeps running.

use thiserror::Error;

/// Errors a host reports when a subscription cannot be made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The object does not expose the requested signal on this host version.
    #[error("Signal '{0}' is not available on this object")]
    UnknownSignal(String),

    /// The host refused the connection.
    #[error("Connecting to '{signal}' failed: {reason}")]
    Rejected {
        /// The signal that was being connected.
        signal: String,
        /// Host-provided reason.
        reason: String,
    },
}

/// Errors raised while handing a call to the transport.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The delivery queue was closed (the worker task has exited).
    #[error("Delivery queue closed")]
    QueueClosed,

    /// D-Bus error.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// Writing a call to an output stream failed.
    #[error("Failed to write call: {0}")]
    Io(#[from] std::io::Error),
}

/// A record could not be encoded as JSON.
#[derive(Error, Debug)]
#[error("Failed to encode {what}: {source}")]
pub struct EncodeError {
    /// What was being encoded (for logging).
    pub what: &'static str,
    /// The underlying serializer error.
    #[source]
    pub source: serde_json::Error,
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config directory could not be determined.
    #[error("Config directory not found")]
    NoDirFound,

    /// Failed to read the config file.
    #[error("Failed to read config file: {0}")]
    ReadFailed(#[source] std::io::Error),

    /// Failed to parse the config file.
    #[error("Failed to parse config: {0}")]
    ParseFailed(#[source] toml::de::Error),
}
