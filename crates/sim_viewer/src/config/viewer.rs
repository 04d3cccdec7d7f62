//! Viewer configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Config, ConfigError};
use crate::camera::CameraMode;

/// # Viewer Configuration
///
/// Update rate, camera, grid and asset lookup settings for the
/// synchronization core. Every field has a default, so partial files load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Maximum effectful ticks per second
    pub max_update_rate: f64,
    /// Distance between the camera and the followed entity in Follow mode
    pub follow_distance: f64,
    /// Camera mode at startup
    pub initial_camera_mode: CameraMode,
    /// Whether entity trails are drawn at startup
    pub trails_enabled: bool,
    /// Extent of the default ground grid
    pub grid_size: f64,
    /// Spacing between default grid lines
    pub grid_spacing: f64,
    /// Axis length of the default origin marker
    pub origin_length: f64,
    /// Directories searched for terrain and model descriptors
    pub asset_search_paths: Vec<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            max_update_rate: 1.0,
            follow_distance: 50.0,
            initial_camera_mode: CameraMode::Follow,
            trails_enabled: false,
            grid_size: 10_000.0,
            grid_spacing: 100.0,
            origin_length: 1.0,
            asset_search_paths: Vec::new(),
        }
    }
}

impl ViewerConfig {
    /// Set the maximum update rate
    pub fn with_max_update_rate(mut self, rate: f64) -> Self {
        self.max_update_rate = rate;
        self
    }

    /// Set the follow distance
    pub fn with_follow_distance(mut self, distance: f64) -> Self {
        self.follow_distance = distance;
        self
    }

    /// Add a directory to the asset search path
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.asset_search_paths.push(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_update_rate.is_finite() && self.max_update_rate > 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_update_rate",
                reason: format!("must be positive and finite, got {}", self.max_update_rate),
            });
        }
        if !(self.follow_distance.is_finite() && self.follow_distance > 0.0) {
            return Err(ConfigError::Invalid {
                field: "follow_distance",
                reason: format!("must be positive and finite, got {}", self.follow_distance),
            });
        }
        if self.grid_spacing <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "grid_spacing",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Config for ViewerConfig {}
