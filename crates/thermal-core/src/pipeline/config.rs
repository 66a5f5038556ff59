use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmOptions;
use crate::color::RenderOptions;
use crate::consts::REFERENCE_HUMIDITY;
use crate::error::Result;
use crate::temperature::FixedPointScale;

/// Engine settings that are not stored per capture.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub correction: CorrectionConfig,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub alarm: AlarmOptions,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeConfig {
    #[serde(default)]
    pub scale: FixedPointScale,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Apply distance/emissivity correction when a table is available.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Relative humidity in `[0, 1]`.
    #[serde(default = "default_humidity")]
    pub humidity: f32,
}

fn default_enabled() -> bool {
    true
}

fn default_humidity() -> f32 {
    REFERENCE_HUMIDITY
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            humidity: REFERENCE_HUMIDITY,
        }
    }
}
