//! State normalizer.
//!
//! Pure functions from host objects to canonical records. No I/O, no side
//! effects, no errors: missing or malformed host data is default-filled
//! through the [`FromHost`] rules, so normalizing an unchanged object twice
//! gives identical output.

mod fields;

pub use fields::{FromHost, OutputName, Rect, truthy};

use serde::Serialize;
use serde_json::Value;

use crate::error::EncodeError;
use crate::host::PropertySource;
use crate::model::{
    CursorPosition, DesktopRecord, GeometryRecord, MaximizedState, Opacity, TileRecord,
    WindowRecord,
};

/// Read one property through its default rule.
pub fn read<T: FromHost>(source: &(impl PropertySource + ?Sized), name: &str) -> T {
    T::from_host(source.property(name).as_ref())
}

/// Normalize a window into a full record.
pub fn window_record(window: &(impl PropertySource + ?Sized)) -> WindowRecord {
    WindowRecord {
        internal_id: read(window, "internalId"),
        caption: read(window, "caption"),
        resource_name: read(window, "resourceName"),
        resource_class: read(window, "resourceClass"),
        window_role: read(window, "windowRole"),
        desktop_file_name: read(window, "desktopFileName"),
        pid: read(window, "pid"),
        geometry: geometry_record(window),
        opacity: read(window, "opacity"),
        active: read(window, "active"),
        full_screen: read(window, "fullScreen"),
        full_screenable: read(window, "fullScreenable"),
        minimized: read(window, "minimized"),
        minimizable: read(window, "minimizable"),
        maximizable: read(window, "maximizable"),
        closeable: read(window, "closeable"),
        moveable: read(window, "moveable"),
        resizeable: read(window, "resizeable"),
        keep_above: read(window, "keepAbove"),
        keep_below: read(window, "keepBelow"),
        no_border: read(window, "noBorder"),
        skip_taskbar: read(window, "skipTaskbar"),
        skip_pager: read(window, "skipPager"),
        skip_switcher: read(window, "skipSwitcher"),
        on_all_desktops: read(window, "onAllDesktops"),
        shade: read(window, "shade"),
        normal_window: read(window, "normalWindow"),
        dialog: read(window, "dialog"),
        dock: read(window, "dock"),
        toolbar: read(window, "toolbar"),
        menu: read(window, "menu"),
        splash: read(window, "splash"),
        utility: read(window, "utility"),
        notification: read(window, "notification"),
        special_window: read(window, "specialWindow"),
        desktop_window: read(window, "desktopWindow"),
        popup_window: read(window, "popupWindow"),
        transient: read(window, "transient"),
        modal: read(window, "modal"),
        managed: read(window, "managed"),
        hidden: read(window, "hidden"),
        unresponsive: read(window, "unresponsive"),
        window_type: read(window, "windowType"),
        layer: read(window, "layer"),
        stacking_order: read(window, "stackingOrder"),
        color_scheme: read(window, "colorScheme"),
        output: read::<OutputName>(window, "output").0,
        desktops: read(window, "desktops"),
        activities: read(window, "activities"),
    }
}

/// Frame and buffer geometry of a window.
pub fn geometry_record(window: &(impl PropertySource + ?Sized)) -> GeometryRecord {
    let frame: Rect = read(window, "frameGeometry");
    let buffer: Rect = read(window, "bufferGeometry");
    GeometryRecord {
        x: frame.x,
        y: frame.y,
        width: frame.width,
        height: frame.height,
        buffer_x: buffer.x,
        buffer_y: buffer.y,
        buffer_width: buffer.width,
        buffer_height: buffer.height,
    }
}

/// The window's `internalId` as a string (empty when missing).
pub fn window_id(window: &(impl PropertySource + ?Sized)) -> String {
    read(window, "internalId")
}

/// Current desktop of the workspace, `None` when the host has none.
pub fn current_desktop(workspace: &(impl PropertySource + ?Sized)) -> Option<DesktopRecord> {
    read(workspace, "currentDesktop")
}

/// All desktops of the workspace, in host order.
pub fn desktop_list(workspace: &(impl PropertySource + ?Sized)) -> Vec<DesktopRecord> {
    read(workspace, "desktops")
}

/// Current activity id (empty when activities are not supported).
pub fn current_activity(workspace: &(impl PropertySource + ?Sized)) -> String {
    read(workspace, "currentActivity")
}

/// Cursor position, zero when the host does not report one.
pub fn cursor_position(workspace: &(impl PropertySource + ?Sized)) -> CursorPosition {
    let pos = workspace.property("cursorPos");
    let obj = pos.as_ref().and_then(Value::as_object);
    CursorPosition {
        x: i32::from_host(obj.and_then(|o| o.get("x"))),
        y: i32::from_host(obj.and_then(|o| o.get("y"))),
    }
}

/// How a single window property is read for a property-changed emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// String property.
    Text(&'static str),
    /// Boolean property.
    Flag(&'static str),
    /// `opacity`, defaulting to 1.0.
    Opacity,
    /// Name of the `output` object.
    Output,
    /// `desktops` as a list of desktop records.
    Desktops,
    /// `activities` as a list of ids.
    Activities,
    /// `tile` rect, or null.
    Tile,
    /// `maximizedHorizontally` and `maximizedVertically` in one object.
    Maximized,
    /// A constant, for events whose payload is the event itself.
    Fixed(bool),
}

/// The wire value of one window field.
///
/// Serializes untagged, so object keys keep the order of the record structs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(f64),
    Desktops(Vec<DesktopRecord>),
    Activities(Vec<String>),
    Tile(Option<TileRecord>),
    Maximized(MaximizedState),
}

/// Read the current value of a field as sent on the wire.
pub fn field_value(window: &(impl PropertySource + ?Sized), field: Field) -> FieldValue {
    match field {
        Field::Text(name) => FieldValue::Text(read(window, name)),
        Field::Flag(name) => FieldValue::Flag(read(window, name)),
        Field::Opacity => FieldValue::Number(read::<Opacity>(window, "opacity").0),
        Field::Output => FieldValue::Text(read::<OutputName>(window, "output").0),
        Field::Desktops => FieldValue::Desktops(read(window, "desktops")),
        Field::Activities => FieldValue::Activities(read(window, "activities")),
        Field::Tile => FieldValue::Tile(read(window, "tile")),
        Field::Maximized => FieldValue::Maximized(MaximizedState {
            horizontally: read(window, "maximizedHorizontally"),
            vertically: read(window, "maximizedVertically"),
        }),
        Field::Fixed(value) => FieldValue::Flag(value),
    }
}

/// Encode a record as compact JSON.
///
/// `None` encodes as the sentinel `null`, which consumers special-case.
pub fn encode<T: Serialize + ?Sized>(what: &'static str, value: &T) -> Result<String, EncodeError> {
    serde_json::to_string(value).map_err(|source| EncodeError { what, source })
}
