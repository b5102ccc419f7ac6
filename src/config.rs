//! Run configuration, read from an optional TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_CATALOG_URL;
use crate::error::{Result, TrackError};
use crate::frames::GstModel;
use crate::render::{default_ground_stations, GroundStation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub catalog_url: String,
    /// Read the catalog from disk instead of fetching `catalog_url`.
    pub catalog_file: Option<PathBuf>,
    pub fetch_timeout_s: u64,
    pub gst_model: GstModel,
    /// UT1 - UTC in seconds.
    pub dut1_s: f64,
    pub step_minutes: i64,
    /// Bounds both the animation length and the trajectory history.
    pub max_steps: usize,
    pub zoom_deg: f64,
    pub originator: String,
    pub ground_stations: Vec<GroundStation>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_file: None,
            fetch_timeout_s: 30,
            gst_model: GstModel::Cubic,
            dut1_s: 0.0,
            step_minutes: 5,
            max_steps: 288, // 24 h at 5 min
            zoom_deg: 500.0,
            originator: "groundtrack".to_string(),
            ground_stations: default_ground_stations(),
        }
    }
}

impl TrackerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| TrackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("[config] reading {:?}", path);
        let text = fs::read_to_string(path)
            .map_err(|e| TrackError::Config(format!("failed to read {path:?}: {e}")))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_minutes <= 0 {
            return Err(TrackError::Config(format!(
                "step_minutes must be positive, got {}",
                self.step_minutes
            )));
        }
        if self.max_steps == 0 {
            return Err(TrackError::Config("max_steps must be at least 1".into()));
        }
        if self.fetch_timeout_s == 0 {
            return Err(TrackError::Config("fetch_timeout_s must be at least 1".into()));
        }
        if !self.dut1_s.is_finite() || self.dut1_s.abs() > 0.9 {
            return Err(TrackError::Config(format!("dut1_s must be within ±0.9 s, got {}", self.dut1_s)));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_s)
    }
}
