//! Machine configuration.
//!
//! Read from JSON, e.g. `{ "legacy_ret": true }`. Missing keys take their
//! defaults.

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

/// Behavior switches for [`Cpu`](crate::cpu::Cpu).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// RET also copies the popped return address into its operand register.
    ///
    /// Off by default: conventional RET only restores PC and SP.
    pub legacy_ret: bool,
}

impl CpuConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }
}

/// Errors that can occur while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_conventional_ret() {
        assert!(!CpuConfig::default().legacy_ret);
    }

    #[test]
    fn test_from_json() {
        let config = CpuConfig::from_json(r#"{ "legacy_ret": true }"#).unwrap();
        assert!(config.legacy_ret);
    }

    #[test]
    fn test_missing_keys_default() {
        assert_eq!(CpuConfig::from_json("{}").unwrap(), CpuConfig::default());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            CpuConfig::from_json("{ legacy_ret"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CpuConfig::from_json_file("/nonexistent/ls8.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
