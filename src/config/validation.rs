//! Configuration validation utilities.
//!
//! Provides validation for configuration values, returning warnings for
//! non-fatal issues that should be logged but don't prevent startup.

use zbus::names::{InterfaceName, WellKnownName};
use zbus::zvariant::ObjectPath;

use super::types::BridgeConfig;

/// Non-fatal validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    /// The field that has an issue.
    pub field: String,
    /// A description of the issue.
    pub message: String,
}

/// Validate the entire config, returning warnings for non-fatal issues.
///
/// This function checks for:
/// - A cursor throttle of zero (treated as one)
/// - Endpoint names that D-Bus would reject
pub fn validate_config(config: &BridgeConfig) -> Vec<ValidationWarning> {
    let mut warnings = vec![];

    if config.cursor_throttle == 0 {
        warnings.push(ValidationWarning {
            field: "cursor_throttle".to_string(),
            message: "Throttle 0 is treated as 1. Every cursor motion will be sent.".to_string(),
        });
    }

    let endpoint = &config.endpoint;
    if let Err(e) = WellKnownName::try_from(endpoint.service.as_str()) {
        warnings.push(ValidationWarning {
            field: "endpoint.service".to_string(),
            message: format!("'{}' is not a valid bus name: {}", endpoint.service, e),
        });
    }
    if let Err(e) = ObjectPath::try_from(endpoint.path.as_str()) {
        warnings.push(ValidationWarning {
            field: "endpoint.path".to_string(),
            message: format!("'{}' is not a valid object path: {}", endpoint.path, e),
        });
    }
    if let Err(e) = InterfaceName::try_from(endpoint.interface.as_str()) {
        warnings.push(ValidationWarning {
            field: "endpoint.interface".to_string(),
            message: format!(
                "'{}' is not a valid interface name: {}",
                endpoint.interface, e
            ),
        });
    }

    warnings
}
