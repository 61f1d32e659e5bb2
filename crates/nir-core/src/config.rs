// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Validation configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! mode = "shape-checked"
//! require_non_empty = true
//! warn_isolated_units = true
//! ```

use crate::NirError;
use std::path::Path;

/// How strictly edges are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Only the index-validity invariant.
    #[default]
    IndexOnly,
    /// Index validity plus output/input width compatibility across edges.
    ShapeChecked,
}

impl ValidationMode {
    /// Parses a mode from a config or CLI string.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "index-only" | "index_only" | "index" | "base" => Some(Self::IndexOnly),
            "shape-checked" | "shape_checked" | "shape" | "strict" => Some(Self::ShapeChecked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndexOnly => "index-only",
            Self::ShapeChecked => "shape-checked",
        }
    }

    pub fn is_shape_checked(&self) -> bool {
        matches!(self, Self::ShapeChecked)
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for [`crate::Graph::validate_with`] and [`crate::Graph::freeze`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationConfig {
    /// Edge checking mode.
    #[serde(default)]
    pub mode: ValidationMode,
    /// Reject graphs with no units.
    #[serde(default = "default_true")]
    pub require_non_empty: bool,
    /// Log a warning on freeze for every unit without edges.
    #[serde(default = "default_true")]
    pub warn_isolated_units: bool,
}

fn default_true() -> bool {
    true
}

impl ValidationConfig {
    /// Default settings with shape checking switched on.
    pub fn shape_checked() -> Self {
        Self {
            mode: ValidationMode::ShapeChecked,
            ..Default::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, NirError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NirError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, NirError> {
        toml::from_str(toml_str)
            .map_err(|e| NirError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, NirError> {
        toml::to_string_pretty(self)
            .map_err(|e| NirError::ConfigError(format!("TOML serialise error: {e}")))
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::IndexOnly,
            require_non_empty: true,
            warn_isolated_units: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = ValidationConfig::default();
        assert_eq!(c.mode, ValidationMode::IndexOnly);
        assert!(c.require_non_empty);
        assert!(c.warn_isolated_units);
    }

    #[test]
    fn test_shape_checked() {
        let c = ValidationConfig::shape_checked();
        assert!(c.mode.is_shape_checked());
        assert!(c.require_non_empty);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
mode = "shape-checked"
require_non_empty = false
warn_isolated_units = false
"#;
        let c = ValidationConfig::from_toml(toml).unwrap();
        assert_eq!(c.mode, ValidationMode::ShapeChecked);
        assert!(!c.require_non_empty);
        assert!(!c.warn_isolated_units);
    }

    #[test]
    fn test_from_toml_defaults() {
        let c = ValidationConfig::from_toml("").unwrap();
        assert_eq!(c, ValidationConfig::default());
    }

    #[test]
    fn test_from_toml_bad_mode() {
        let err = ValidationConfig::from_toml(r#"mode = "lenient""#).unwrap_err();
        assert!(matches!(err, NirError::ConfigError(_)));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = ValidationConfig::shape_checked();
        let toml = c.to_toml().unwrap();
        assert!(toml.contains("shape-checked"));
        let back = ValidationConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("nir-config-{}.toml", std::process::id()));
        std::fs::write(&path, "mode = \"shape-checked\"\n").unwrap();
        let c = ValidationConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(c.mode.is_shape_checked());
    }

    #[test]
    fn test_from_missing_file() {
        let err = ValidationConfig::from_file(Path::new("/nonexistent/nir.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(ValidationMode::from_str_loose("strict"), Some(ValidationMode::ShapeChecked));
        assert_eq!(ValidationMode::from_str_loose("Index-Only"), Some(ValidationMode::IndexOnly));
        assert_eq!(ValidationMode::from_str_loose("bogus"), None);
        assert_eq!(ValidationMode::ShapeChecked.to_string(), "shape-checked");
    }
}
