use serde::Serialize;

/// Frame and buffer geometry of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryRecord {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub buffer_x: i64,
    pub buffer_y: i64,
    pub buffer_width: i64,
    pub buffer_height: i64,
}

/// Tile geometry. Carried as `Option<TileRecord>`: a window without a tile
/// encodes as JSON `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TileRecord {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Cursor position in global coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}
