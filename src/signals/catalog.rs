//! Static catalog of per-window signals.
//!
//! The catalog is a superset covering several KWin versions. Any running host
//! may implement only part of it; the registry skips what is missing.

use crate::normalize::Field;

/// What the bridge sends when a window signal fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// `NotifyWindowPropertyChanged(windowId, name, value)`.
    Property {
        /// Property name on the wire.
        name: &'static str,
        /// How to read the value.
        field: Field,
    },
    /// `NotifyGeometryChanged(windowId, geometry)`.
    Geometry,
}

/// One catalog entry: a window signal and the emissions it triggers, in order.
#[derive(Debug, Clone, Copy)]
pub struct WindowSignal {
    /// Host signal name.
    pub signal: &'static str,
    /// Emissions produced by one notification.
    pub emits: &'static [Emit],
}

/// Property name used for interactive move/resize start and end.
pub const MOVE_RESIZE: &str = "interactiveMoveResize";

macro_rules! property_signal {
    ($signal:literal, $name:expr, $field:expr) => {
        WindowSignal {
            signal: $signal,
            emits: &[Emit::Property {
                name: $name,
                field: $field,
            }],
        }
    };
}

/// Every per-window signal the bridge subscribes to.
pub const WINDOW_SIGNALS: &[WindowSignal] = &[
    property_signal!("captionChanged", "caption", Field::Text("caption")),
    property_signal!("minimizedChanged", "minimized", Field::Flag("minimized")),
    property_signal!("fullScreenChanged", "fullScreen", Field::Flag("fullScreen")),
    property_signal!("maximizedChanged", "maximized", Field::Maximized),
    property_signal!("activeChanged", "active", Field::Flag("active")),
    property_signal!("keepAboveChanged", "keepAbove", Field::Flag("keepAbove")),
    property_signal!("keepBelowChanged", "keepBelow", Field::Flag("keepBelow")),
    property_signal!("shadeChanged", "shade", Field::Flag("shade")),
    property_signal!("opacityChanged", "opacity", Field::Opacity),
    property_signal!("desktopsChanged", "desktops", Field::Desktops),
    property_signal!("activitiesChanged", "activities", Field::Activities),
    property_signal!("skipTaskbarChanged", "skipTaskbar", Field::Flag("skipTaskbar")),
    property_signal!("skipPagerChanged", "skipPager", Field::Flag("skipPager")),
    property_signal!("skipSwitcherChanged", "skipSwitcher", Field::Flag("skipSwitcher")),
    property_signal!("windowClassChanged", "resourceClass", Field::Text("resourceClass")),
    property_signal!("windowRoleChanged", "windowRole", Field::Text("windowRole")),
    property_signal!("noBorderChanged", "noBorder", Field::Flag("noBorder")),
    property_signal!("hiddenChanged", "hidden", Field::Flag("hidden")),
    property_signal!("unresponsiveChanged", "unresponsive", Field::Flag("unresponsive")),
    property_signal!("outputChanged", "output", Field::Output),
    property_signal!(
        "desktopFileNameChanged",
        "desktopFileName",
        Field::Text("desktopFileName")
    ),
    property_signal!("tileChanged", "tile", Field::Tile),
    property_signal!("colorSchemeChanged", "colorScheme", Field::Text("colorScheme")),
    property_signal!("decorationChanged", "decoration", Field::Flag("decoration")),
    property_signal!("closeableChanged", "closeable", Field::Flag("closeable")),
    WindowSignal {
        signal: "frameGeometryChanged",
        emits: &[Emit::Geometry],
    },
    property_signal!("interactiveMoveResizeStarted", MOVE_RESIZE, Field::Fixed(true)),
    WindowSignal {
        signal: "interactiveMoveResizeFinished",
        emits: &[
            Emit::Property {
                name: MOVE_RESIZE,
                field: Field::Fixed(false),
            },
            Emit::Geometry,
        ],
    },
];

/// Look up a catalog entry by signal name.
pub fn find(signal: &str) -> Option<&'static WindowSignal> {
    WINDOW_SIGNALS.iter().find(|entry| entry.signal == signal)
}
