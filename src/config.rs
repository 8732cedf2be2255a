//! Loader configuration.
//!
//! Placeholder colors, display density, and preset parameters are plain
//! values carried by a [`LoaderConfig`] handed to
//! [`Loader::new`](crate::loader::Loader::new) — there is no process-wide
//! mutable default, so unrelated call sites cannot interfere with each
//! other. The CLI can load a config from a TOML file; every field has a
//! default, so a partial file (or none at all) works.
//!
//! ```toml
//! # easel.toml
//! density = 2.0
//! blur_sigma = 8.0
//! corner_radius = 24
//! border_width_dp = 3.0
//! ```

use crate::request::Argb;
use crate::transform::BorderSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Explicit configuration for a [`Loader`](crate::loader::Loader).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Display density: device pixels per density-independent unit.
    /// Resolved once at transform construction.
    pub density: f32,
    /// Solid color used when a request has no source.
    pub placeholder: Argb,
    /// Placeholder for circular presets.
    pub circle_placeholder: Argb,
    /// Gaussian sigma for the blur preset.
    pub blur_sigma: f32,
    /// Corner radius in pixels for the rounded preset.
    pub corner_radius: u32,
    /// Border stroke width in density-independent units.
    pub border_width_dp: f32,
    /// Border stroke color.
    pub border_color: Argb,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            placeholder: Argb::TRANSPARENT,
            circle_placeholder: Argb::TRANSPARENT,
            blur_sigma: 10.0,
            corner_radius: 40,
            border_width_dp: 2.0,
            border_color: Argb::rgb(0xAC, 0xAC, 0xAC),
        }
    }
}

impl LoaderConfig {
    /// Load from a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// The configured border as a [`BorderSpec`].
    pub fn border(&self) -> BorderSpec {
        BorderSpec::new(self.border_width_dp, self.border_color)
    }
}
