// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! # depth of nested references before identities are tracked
//! cycle_detection_after = 1000
//! # composite levels a single value may nest
//! max_nesting = 4096
//! ```

use crate::guard::{DEFAULT_CYCLE_THRESHOLD, DEFAULT_MAX_NESTING};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Reference depth after which visited identities are tracked.
    #[serde(default = "default_cycle_detection_after")]
    pub cycle_detection_after: usize,

    /// Structs, containers, references and slots one call may nest through.
    /// A cycle deeper than this is reported as a nesting error.
    #[serde(default = "default_max_nesting")]
    pub max_nesting: usize,
}

fn default_cycle_detection_after() -> usize {
    DEFAULT_CYCLE_THRESHOLD
}

fn default_max_nesting() -> usize {
    DEFAULT_MAX_NESTING
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            cycle_detection_after: default_cycle_detection_after(),
            max_nesting: default_max_nesting(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_detection_after == 0 {
            return Err(ConfigError::Invalid(
                "cycle_detection_after must be greater than 0".into(),
            ));
        }
        if self.max_nesting == 0 {
            return Err(ConfigError::Invalid(
                "max_nesting must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.cycle_detection_after, 1000);
        assert_eq!(config.max_nesting, 4096);
    }

    #[test]
    fn test_parse() {
        let config = CodecConfig::from_toml_str("cycle_detection_after = 16").unwrap();
        assert_eq!(config.cycle_detection_after, 16);
        assert_eq!(config.max_nesting, DEFAULT_MAX_NESTING);

        let config = CodecConfig::from_toml_str("max_nesting = 64").unwrap();
        assert_eq!(config.max_nesting, 64);
        assert_eq!(config.cycle_detection_after, DEFAULT_CYCLE_THRESHOLD);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            CodecConfig::from_toml_str("cycle_detection_after = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("max_nesting = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("cycle_detection_after = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cycle_detection_after = 64").unwrap();
        let config = CodecConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cycle_detection_after, 64);

        assert!(matches!(
            CodecConfig::from_file("/nonexistent/bytecodec.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
