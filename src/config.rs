//! Generator configuration.
//!
//! Built from defaults, optionally overlaid with a JSON file, then overridden by
//! command line flags. Missing fields keep their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biomes::BiomeThresholds;
use crate::coords::GridDimensions;
use crate::error::ConfigError;
use crate::noise_field::{NoiseParams, WrapMode};

/// Largest width or height the 16-bit wire header can carry.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Everything needed to generate a map apart from the seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Map width in cells
    pub width: u32,
    /// Map height in cells
    pub height: u32,
    pub noise: NoiseParams,
    pub thresholds: BiomeThresholds,
    pub wrap: WrapMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 100,
            noise: NoiseParams::default(),
            thresholds: BiomeThresholds::default(),
            wrap: WrapMode::default(),
        }
    }
}

impl GeneratorConfig {
    /// Default configuration with the given dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.width, self.height)
    }

    /// Reject configurations that cannot produce a valid map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        for value in [self.width, self.height] {
            if value > MAX_DIMENSION {
                return Err(ConfigError::DimensionTooLarge {
                    value,
                    max: MAX_DIMENSION,
                });
            }
        }
        self.noise.validate()?;
        self.thresholds.validate()?;
        Ok(())
    }
}
