//! Runtime configuration, read from TOML.
//!
//! ```toml
//! [assets]
//! root = "./assets"
//! base_url = "https://cdn.example.com/models/"
//!
//! [defaults]
//! bodyColor = "#ffffff"
//! wheelColor = "#000000"
//! wheelScale = 1.0
//! finish = "glossy"
//!
//! [wheel_scale]
//! min = 0.5
//! max = 1.2
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    customize::CustomizationRequest,
    error::{Error, Result},
};

/// Overrides `assets.root` when set.
pub const ASSET_ROOT_ENV: &str = "CAR_CUSTOMIZER_ASSET_ROOT";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CustomizerConfig {
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub defaults: CustomizationRequest,
    #[serde(default)]
    pub wheel_scale: WheelScaleRange,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "default_asset_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: default_asset_root(),
            base_url: None,
        }
    }
}

fn default_asset_root() -> PathBuf {
    Path::new("./").join("assets")
}

/// Bounds offered to the user for the wheel size slider.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WheelScaleRange {
    pub min: f32,
    pub max: f32,
}

impl Default for WheelScaleRange {
    fn default() -> Self {
        Self { min: 0.5, max: 1.2 }
    }
}

impl CustomizerConfig {
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` and applies the environment override for the asset root.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(root) = std::env::var(ASSET_ROOT_ENV) {
            log::debug!("Asset root overridden by {ASSET_ROOT_ENV}: {root}");
            self.assets.root = PathBuf::from(root);
        }
    }

    /// Clamps a slider value into the configured wheel scale range.
    pub fn clamp_wheel_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.wheel_scale.min, self.wheel_scale.max)
    }

    fn validate(&self) -> Result<()> {
        let WheelScaleRange { min, max } = self.wheel_scale;
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(Error::Config(format!(
                "wheel_scale range must satisfy 0 < min <= max, got {min}..{max}"
            )));
        }
        self.defaults
            .validate()
            .map_err(|e| Error::Config(format!("defaults: {e}")))
    }
}
