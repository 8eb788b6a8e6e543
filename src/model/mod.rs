//! Canonical records sent over the bridge.
//!
//! Records are plain data: the normalizer builds them fresh from the host on
//! every emission and serde turns them into the JSON payloads. Field order in
//! these structs is the key order on the wire.

mod desktop;
mod geometry;
mod window;

pub use desktop::DesktopRecord;
pub use geometry::{CursorPosition, GeometryRecord, TileRecord};
pub use window::{MaximizedState, Opacity, WindowRecord};

/// Opaque activity identifier.
pub type ActivityId = String;
