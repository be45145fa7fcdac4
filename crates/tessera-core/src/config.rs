//! Engine configuration.
//!
//! [`GraphConfig`] is plain data with builder setters and a TOML form:
//!
//! ```toml
//! default_lerp_ticks = 4
//! block_size = 256
//! sample_rate = 48000.0
//! publish_display = true
//! ```
//!
//! Missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings shared by every node in a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Ramp duration given to newly declared input pins that leave theirs
    /// unset, in ticks.
    pub default_lerp_ticks: u64,
    /// Samples per flow buffer produced by built-in nodes.
    pub block_size: usize,
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Copy connected flow buffers into display snapshots during evaluation.
    pub publish_display: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_lerp_ticks: 0,
            block_size: 256,
            sample_rate: 48000.0,
            publish_display: true,
        }
    }
}

impl GraphConfig {
    /// Sets the default input ramp duration.
    pub fn with_default_lerp_ticks(mut self, ticks: u64) -> Self {
        self.default_lerp_ticks = ticks;
        self
    }

    /// Sets the flow block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Enables or disables display publishing.
    pub fn with_publish_display(mut self, publish: bool) -> Self {
        self.publish_display = publish;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "block_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "sample_rate",
                reason: format!("must be a positive number, got {}", self.sample_rate),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GraphConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = GraphConfig::from_toml_str("block_size = 64\n").unwrap();
        assert_eq!(config.block_size, 64);
        assert_eq!(config.sample_rate, 48000.0);
        assert!(config.publish_display);
    }

    #[test]
    fn toml_round_trip() {
        let config = GraphConfig::default()
            .with_default_lerp_ticks(8)
            .with_publish_display(false);
        let text = config.to_toml_string().unwrap();
        assert_eq!(GraphConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_zero_block_size() {
        let err = GraphConfig::from_toml_str("block_size = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "block_size",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_sample_rate() {
        let config = GraphConfig::default().with_sample_rate(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = GraphConfig::from_toml_str("block_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
