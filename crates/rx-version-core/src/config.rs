//! Configuration constants and runtime settings.

use serde::{Deserialize, Serialize};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Flat per-prescription service charge.
pub const TECHNICAL_FEE: f64 = 336_000.0;

/// Key the working version is stored under.
pub const STORAGE_KEY: &str = "versionItems";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "rx_version_core=info";

/// Settings for a version builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Technical fee added once to every total
    pub technical_fee: f64,
    /// Store key for the persisted working list
    pub storage_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            technical_fee: TECHNICAL_FEE,
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.technical_fee, 336000.0);
        assert_eq!(settings.storage_key, "versionItems");
    }

    #[test]
    fn test_from_json_partial() {
        let settings = Settings::from_json(r#"{"technical_fee": 400000}"#).unwrap();
        assert_eq!(settings.technical_fee, 400000.0);
        assert_eq!(settings.storage_key, STORAGE_KEY);
    }

    #[test]
    fn test_from_json_empty_object() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(Settings::from_json("not json").is_err());
    }
}
