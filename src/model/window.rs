use serde::Serialize;

use super::{DesktopRecord, GeometryRecord};

/// Window opacity in `[0, 1]`. Defaults to fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Opacity(pub f64);

impl Default for Opacity {
    fn default() -> Self {
        Opacity(1.0)
    }
}

/// Both maximize flags, sent together on one maximize notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaximizedState {
    pub horizontally: bool,
    pub vertically: bool,
}

/// Canonical snapshot of one window.
///
/// Every field is total: the normalizer fills anything the host does not
/// provide with its default, so consumers never see a partial record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    pub internal_id: String,
    pub caption: String,
    pub resource_name: String,
    pub resource_class: String,
    pub window_role: String,
    pub desktop_file_name: String,
    pub pid: i64,
    #[serde(flatten)]
    pub geometry: GeometryRecord,
    pub opacity: Opacity,
    pub active: bool,
    pub full_screen: bool,
    pub full_screenable: bool,
    pub minimized: bool,
    pub minimizable: bool,
    pub maximizable: bool,
    pub closeable: bool,
    pub moveable: bool,
    pub resizeable: bool,
    pub keep_above: bool,
    pub keep_below: bool,
    pub no_border: bool,
    pub skip_taskbar: bool,
    pub skip_pager: bool,
    pub skip_switcher: bool,
    pub on_all_desktops: bool,
    pub shade: bool,
    pub normal_window: bool,
    pub dialog: bool,
    pub dock: bool,
    pub toolbar: bool,
    pub menu: bool,
    pub splash: bool,
    pub utility: bool,
    pub notification: bool,
    pub special_window: bool,
    pub desktop_window: bool,
    pub popup_window: bool,
    pub transient: bool,
    pub modal: bool,
    pub managed: bool,
    pub hidden: bool,
    pub unresponsive: bool,
    pub window_type: i64,
    pub layer: i64,
    pub stacking_order: i64,
    pub color_scheme: String,
    /// Output (screen) name.
    pub output: String,
    pub desktops: Vec<DesktopRecord>,
    pub activities: Vec<String>,
}
