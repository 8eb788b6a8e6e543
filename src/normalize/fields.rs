//! Per-type default rules for loosely typed host values.
//!
//! Each canonical field type implements [`FromHost`], which maps any host
//! value (or its absence) to a total value of that type. Building a record
//! field by field through this trait is what guarantees a record is never
//! partially populated.

use serde_json::{Map, Value};

use crate::model::{DesktopRecord, Opacity, TileRecord};

/// Conversion from an optional, loosely typed host value.
pub trait FromHost: Sized {
    /// Convert, falling back to the type's default when the value is
    /// absent, null or of an unusable type.
    fn from_host(value: Option<&Value>) -> Self;
}

/// Host truthiness: null, false, 0, NaN and "" are false, everything else
/// (including empty objects and arrays) is true.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

impl FromHost for bool {
    fn from_host(value: Option<&Value>) -> Self {
        truthy(value)
    }
}

impl FromHost for String {
    fn from_host(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            _ => String::new(),
        }
    }
}

impl FromHost for i64 {
    fn from_host(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|f| f.is_finite())
                            .map(|f| f.round() as i64)
                    })
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

impl FromHost for i32 {
    fn from_host(value: Option<&Value>) -> Self {
        let wide = i64::from_host(value);
        i32::try_from(wide).unwrap_or(if wide < 0 { i32::MIN } else { i32::MAX })
    }
}

impl FromHost for Opacity {
    fn from_host(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_f64) {
            Some(f) if f.is_finite() => Opacity(f.clamp(0.0, 1.0)),
            _ => Opacity::default(),
        }
    }
}

impl FromHost for DesktopRecord {
    fn from_host(value: Option<&Value>) -> Self {
        let Some(obj) = as_object(value) else {
            return DesktopRecord::default();
        };
        DesktopRecord {
            id: String::from_host(obj.get("id")),
            name: String::from_host(obj.get("name")),
            x11_desktop_number: i64::from_host(obj.get("x11DesktopNumber")),
        }
    }
}

impl FromHost for Option<DesktopRecord> {
    fn from_host(value: Option<&Value>) -> Self {
        as_object(value).map(|_| DesktopRecord::from_host(value))
    }
}

impl FromHost for Option<TileRecord> {
    fn from_host(value: Option<&Value>) -> Self {
        // A missing tile and a null tile are the same case.
        as_object(value).map(|_| {
            let rect = Rect::from_host(value);
            TileRecord {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            }
        })
    }
}

impl<T: FromHost> FromHost for Vec<T> {
    fn from_host(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Array(items)) => items.iter().map(|item| T::from_host(Some(item))).collect(),
            _ => Vec::new(),
        }
    }
}

/// An integer rectangle read from a host geometry object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl FromHost for Rect {
    fn from_host(value: Option<&Value>) -> Self {
        let Some(obj) = as_object(value) else {
            return Rect::default();
        };
        Rect {
            x: i64::from_host(obj.get("x")),
            y: i64::from_host(obj.get("y")),
            width: i64::from_host(obj.get("width")),
            height: i64::from_host(obj.get("height")),
        }
    }
}

/// Name of the output a window is on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputName(pub String);

impl FromHost for OutputName {
    fn from_host(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(obj)) => OutputName(String::from_host(obj.get("name"))),
            Some(Value::String(s)) => OutputName(s.clone()),
            _ => OutputName::default(),
        }
    }
}

fn as_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&Value::Null)));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!(false))));
        assert!(truthy(Some(&json!(1))));
        assert!(truthy(Some(&json!(-0.5))));
        assert!(truthy(Some(&json!("no"))));
        assert!(truthy(Some(&json!({}))));
        assert!(truthy(Some(&json!([]))));
    }

    #[test]
    fn test_string_rules() {
        assert_eq!(String::from_host(None), "");
        assert_eq!(String::from_host(Some(&Value::Null)), "");
        assert_eq!(String::from_host(Some(&json!("Term"))), "Term");
        assert_eq!(String::from_host(Some(&json!(42))), "42");
        assert_eq!(String::from_host(Some(&json!(true))), "true");
        assert_eq!(String::from_host(Some(&json!(false))), "");
        assert_eq!(String::from_host(Some(&json!({"a": 1}))), "");
    }

    #[test]
    fn test_integer_rules() {
        assert_eq!(i64::from_host(None), 0);
        assert_eq!(i64::from_host(Some(&json!(800))), 800);
        assert_eq!(i64::from_host(Some(&json!(799.6))), 800);
        assert_eq!(i64::from_host(Some(&json!(-10.4))), -10);
        assert_eq!(i64::from_host(Some(&json!("1234"))), 1234);
        assert_eq!(i64::from_host(Some(&json!("12.5"))), 13);
        assert_eq!(i64::from_host(Some(&json!("abc"))), 0);
        assert_eq!(i64::from_host(Some(&json!(true))), 0);
    }

    #[test]
    fn test_i32_saturates() {
        assert_eq!(i32::from_host(Some(&json!(5_000_000_000i64))), i32::MAX);
        assert_eq!(i32::from_host(Some(&json!(-5_000_000_000i64))), i32::MIN);
        assert_eq!(i32::from_host(Some(&json!(17))), 17);
    }

    #[test]
    fn test_opacity_rules() {
        assert_eq!(Opacity::from_host(None), Opacity(1.0));
        assert_eq!(Opacity::from_host(Some(&json!("0.5"))), Opacity(1.0));
        assert_eq!(Opacity::from_host(Some(&json!(0.25))), Opacity(0.25));
        assert_eq!(Opacity::from_host(Some(&json!(0))), Opacity(0.0));
        assert_eq!(Opacity::from_host(Some(&json!(3))), Opacity(1.0));
        assert_eq!(Opacity::from_host(Some(&json!(-1))), Opacity(0.0));
    }

    #[test]
    fn test_rect_defaults() {
        assert_eq!(Rect::from_host(None), Rect::default());
        assert_eq!(Rect::from_host(Some(&json!(12))), Rect::default());
        assert_eq!(
            Rect::from_host(Some(&json!({"x": 5, "width": 100}))),
            Rect {
                x: 5,
                y: 0,
                width: 100,
                height: 0
            }
        );
    }

    #[test]
    fn test_output_name() {
        assert_eq!(OutputName::from_host(None).0, "");
        assert_eq!(OutputName::from_host(Some(&json!({"name": "DP-1"}))).0, "DP-1");
        assert_eq!(OutputName::from_host(Some(&json!({"model": "x"}))).0, "");
        assert_eq!(OutputName::from_host(Some(&json!("HDMI-A-1"))).0, "HDMI-A-1");
    }

    #[test]
    fn test_lists_default_to_empty() {
        assert!(Vec::<String>::from_host(None).is_empty());
        assert!(Vec::<String>::from_host(Some(&json!({"0": "a"}))).is_empty());
        assert_eq!(
            Vec::<String>::from_host(Some(&json!(["a", 2, null]))),
            vec!["a".to_string(), "2".to_string(), String::new()]
        );
    }

    #[test]
    fn test_desktop_elements_are_defaulted() {
        let desktops = Vec::<DesktopRecord>::from_host(Some(&json!([
            {"id": "d1", "name": "One", "x11DesktopNumber": 1},
            {"id": "d2"},
            null
        ])));
        assert_eq!(desktops.len(), 3);
        assert_eq!(desktops[1].name, "");
        assert_eq!(desktops[1].x11_desktop_number, 0);
        assert_eq!(desktops[2].id, "");
    }

    #[test]
    fn test_tile_absent_and_null_match() {
        assert_eq!(Option::<TileRecord>::from_host(None), None);
        assert_eq!(Option::<TileRecord>::from_host(Some(&Value::Null)), None);
        assert_eq!(
            Option::<TileRecord>::from_host(Some(&json!({"x": 0, "y": 0, "width": 960, "height": 1080}))),
            Some(TileRecord {
                x: 0,
                y: 0,
                width: 960,
                height: 1080
            })
        );
    }
}
