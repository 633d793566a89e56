//! Render configuration files
//!
//! A JSON object whose keys are all optional; anything left out falls back to
//! the built-in default. Command-line flags are collected into the same
//! structure, so precedence is just two merges: defaults, then the file,
//! then explicit flags.
//!
//! ```json
//! {
//!   "field": "T",
//!   "vmin": 19.0,
//!   "vmax": 20.05,
//!   "n_contours": 100,
//!   "colormap": "inferno",
//!   "ticks": [19.0, 19.5, 20.0],
//!   "dpi": 150,
//!   "theme": "light"
//! }
//! ```

use crate::errors::{Result, SliceVisError};
use crate::render::camera::Camera;
use crate::render::canvas::Theme;
use crate::render::levels::ColorbarTicks;
use crate::render::RenderParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Partial render settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    pub field: Option<String>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub n_contours: Option<usize>,
    pub colormap: Option<String>,
    pub value_offset: Option<f64>,
    /// Literal colour-bar ticks; derived from the value range when absent
    pub ticks: Option<Vec<f64>>,
    pub colorbar_label: Option<String>,
    pub dpi: Option<f64>,
    pub elevation: Option<f64>,
    pub azimuth: Option<f64>,
    pub theme: Option<Theme>,
}

impl RenderConfig {
    /// Parse a configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SliceVisError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| {
            SliceVisError::Config(format!("invalid configuration in '{}': {}", path.display(), e))
        })
    }

    /// Settings from `self`, overridden by every value present in `over`
    pub fn merge(self, over: RenderConfig) -> RenderConfig {
        RenderConfig {
            field: over.field.or(self.field),
            vmin: over.vmin.or(self.vmin),
            vmax: over.vmax.or(self.vmax),
            n_contours: over.n_contours.or(self.n_contours),
            colormap: over.colormap.or(self.colormap),
            value_offset: over.value_offset.or(self.value_offset),
            ticks: over.ticks.or(self.ticks),
            colorbar_label: over.colorbar_label.or(self.colorbar_label),
            dpi: over.dpi.or(self.dpi),
            elevation: over.elevation.or(self.elevation),
            azimuth: over.azimuth.or(self.azimuth),
            theme: over.theme.or(self.theme),
        }
    }

    /// Render parameters with every missing value taken from the defaults
    pub fn to_parameters(&self) -> RenderParameters {
        let defaults = RenderParameters::default();
        RenderParameters {
            field: self.field.clone().unwrap_or(defaults.field),
            vmin: self.vmin.unwrap_or(defaults.vmin),
            vmax: self.vmax.unwrap_or(defaults.vmax),
            n_contours: self.n_contours.unwrap_or(defaults.n_contours),
            colormap: self.colormap.clone().unwrap_or(defaults.colormap),
            value_offset: self.value_offset.unwrap_or(defaults.value_offset),
            ticks: self
                .ticks
                .clone()
                .map_or(defaults.ticks, ColorbarTicks::Fixed),
            colorbar_label: self
                .colorbar_label
                .clone()
                .unwrap_or(defaults.colorbar_label),
            dpi: self.dpi.unwrap_or(defaults.dpi),
            camera: Camera::new(
                self.elevation.unwrap_or(defaults.camera.elevation_deg),
                self.azimuth.unwrap_or(defaults.camera.azimuth_deg),
            ),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.unwrap_or_default()
    }
}
