// SPDX: CC0-1.0

//! Runtime settings, optionally read from a JSON file.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes, e.g. `{ "surface": { "width": 800, "height": 800 } }`.

use crate::{
    sample::{Sweep, MAX_SAMPLES},
    scene::MAX_UNITS_PER_AXE,
    Number,
};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::{fs, path::PathBuf};

/// Names a JSON config file to load instead of the defaults.
pub const CONFIG_ENV: &str = "PARAMETRIC_PLOT_CONFIG";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of each axis in world units; the view spans half of it on
    /// either side of the origin.
    pub units_per_axe: Number,
    pub surface: SurfaceConfig,
    pub cartesian: Sweep,
    pub polar: Sweep,
    /// Where rendered images are written.
    pub output_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units_per_axe: 8.0,
            surface: SurfaceConfig::default(),
            cartesian: Sweep::CARTESIAN,
            polar: Sweep::POLAR,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text).context("invalid config json")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file named by [`CONFIG_ENV`], or falls back to defaults
    /// when it isn't set.
    pub fn load() -> anyhow::Result<Self> {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Ok(Self::default());
        };
        let path = PathBuf::from(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.units_per_axe > 0.0 && self.units_per_axe <= MAX_UNITS_PER_AXE) {
            bail!(
                "units_per_axe must be in (0, {MAX_UNITS_PER_AXE}], got {}",
                self.units_per_axe
            );
        }
        for (name, sweep) in [("cartesian", &self.cartesian), ("polar", &self.polar)] {
            if !(sweep.step.is_finite() && sweep.step > 0.0) {
                bail!("{name} sweep step must be positive, got {}", sweep.step);
            }
            if !(sweep.start.is_finite() && sweep.end.is_finite()) || sweep.is_empty() {
                bail!(
                    "{name} sweep [{}, {}) is empty or unbounded",
                    sweep.start,
                    sweep.end
                );
            }
            if sweep.len() > MAX_SAMPLES {
                bail!(
                    "{name} sweep takes {} samples, at most {MAX_SAMPLES} are allowed",
                    sweep.len()
                );
            }
        }
        Ok(())
    }
}
