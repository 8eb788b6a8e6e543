use serde::Serialize;

/// A virtual desktop.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopRecord {
    /// Host desktop id.
    pub id: String,
    /// User-visible name.
    pub name: String,
    /// Legacy X11 desktop index.
    pub x11_desktop_number: i64,
}

impl PartialEq for DesktopRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DesktopRecord {}
