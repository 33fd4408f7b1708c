//! Pipeline configuration.
//!
//! Loaded from a JSON file at startup; every field has a default so a
//! missing or partial file still yields a usable configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capture device index.
    pub camera_index: u32,
    /// Filter active at startup.
    pub default_filter: String,
    /// Render target size in pixels.
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Longest working-image side for contour detection.
    pub analysis_max_dimension: u32,
    /// Fixed binarization level for detection; omit to pick per frame.
    pub contour_threshold: Option<u8>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            default_filter: "None".to_string(),
            viewport_width: 1080.0,
            viewport_height: 1920.0,
            analysis_max_dimension: 300,
            contour_threshold: None,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::Io(_)) => {
                log::info!("No configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable configuration {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
