//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::dispatch::Endpoint;

/// Default N of the cursor throttle.
pub const DEFAULT_CURSOR_THROTTLE: u64 = 3;

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Emit one cursor motion in this many.
    pub cursor_throttle: u64,
    /// Send window added/removed notifications and the startup window list.
    pub window_lifecycle: bool,
    /// Where calls are delivered.
    pub endpoint: Endpoint,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cursor_throttle: DEFAULT_CURSOR_THROTTLE,
            window_lifecycle: true,
            endpoint: Endpoint::default(),
        }
    }
}
