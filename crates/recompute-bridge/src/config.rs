//! Recompute settings, loadable from JSON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use panel_types::PanelSize;
use shape_ops::{BuildOptions, DEFAULT_TESSELLATION_TOLERANCE, DEFAULT_THROUGH_CUT_DEPTH};

use crate::error::ConfigError;

/// Quiet interval before an edit burst triggers a recompute.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Settings shared by the worker and the session. Every field has a default,
/// so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecomputeConfig {
    /// Chordal tolerance for tessellation, in millimetres.
    pub tessellation_tolerance: f64,
    /// Depth used by cuts without an explicit depth.
    pub through_cut_depth: f64,
    /// Debounce quiet interval in milliseconds.
    pub debounce_ms: u64,
    /// Size of the resize seeded into an empty history.
    pub default_panel: PanelSize,
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self {
            tessellation_tolerance: DEFAULT_TESSELLATION_TOLERANCE,
            through_cut_depth: DEFAULT_THROUGH_CUT_DEPTH,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_panel: PanelSize {
                w: 600.0,
                h: 400.0,
                t: 18.0,
            },
        }
    }
}

impl RecomputeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    reason: format!("{name} must be positive, got {v}"),
                })
            }
        };
        positive("tessellation_tolerance", self.tessellation_tolerance)?;
        positive("through_cut_depth", self.through_cut_depth)?;
        positive("default_panel.w", self.default_panel.w)?;
        positive("default_panel.h", self.default_panel.h)?;
        positive("default_panel.t", self.default_panel.t)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            tessellation_tolerance: self.tessellation_tolerance,
            through_cut_depth: self.through_cut_depth,
        }
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
