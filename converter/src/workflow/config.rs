use anyhow::Context;
use igccore::kml::RenderConfig;
use igccore::math::UnitConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Unit tokens as written by the user; validated by [`ConverterConfig::unit_config`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnitTokens {
    pub horizontal: String,
    pub vertical: String,
    pub altitude: String,
}

impl Default for UnitTokens {
    fn default() -> Self {
        let units = UnitConfig::default();
        Self {
            horizontal: units.horizontal.to_string(),
            vertical: units.vertical.to_string(),
            altitude: units.altitude.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConverterConfig {
    pub units: UnitTokens,
    pub pilot: Option<String>,
    #[serde(flatten)]
    pub render: RenderConfig,
}

impl ConverterConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading converter config {}", path_ref.display()))?;
        let config: ConverterConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing converter config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Resolves the unit tokens, failing with `InvalidUnit` on unknown or misplaced tokens.
    pub fn unit_config(&self) -> anyhow::Result<UnitConfig> {
        let units = UnitConfig::from_tokens(
            &self.units.horizontal,
            &self.units.vertical,
            &self.units.altitude,
        )?;
        Ok(units)
    }
}
