//! Pipeline and source configuration.
//!
//! The analysis stream and still capture run at different resolutions,
//! so the camera section carries both. The analysis interval is the
//! minimum spacing between accepted samples; the first frame is always
//! accepted regardless of it.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Index of the camera device to open.
    pub device_id: u32,
    /// Preview stream width in pixels (analysis resolution).
    pub width: u32,
    /// Preview stream height in pixels.
    pub height: u32,
    /// Target frames per second for the preview stream.
    pub fps: u32,
    /// Still capture width in pixels (full resolution).
    pub still_width: u32,
    /// Still capture height in pixels.
    pub still_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
            still_width: 1920,
            still_height: 1080,
        }
    }
}

impl CameraConfig {
    /// Checks dimension and frame-rate bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.still_width == 0 || self.still_height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum spacing between accepted analysis samples, in
    /// milliseconds of monotonic frame time.
    pub interval_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl AnalysisConfig {
    /// Checks that the sampling interval is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

/// Errors from loading or validating configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("frame dimensions must be nonzero")]
    InvalidDimensions,
    #[error("frame rate out of range (1-120 fps)")]
    InvalidFrameRate,
    #[error("analysis interval must be nonzero")]
    InvalidInterval,
    #[error("could not read config file: {0}")]
    FileReadError(String),
    #[error("could not parse config file: {0}")]
    ParseError(String),
}

/// Top-level TOML document; every section falls back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Frame source section.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Analysis pipeline section.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Demo runner section.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Demo runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Run continuously (true) or process a fixed number of frames (false).
    pub continuous: bool,
    /// Number of frames to push if not continuous.
    pub frame_count: u32,
    /// Analysis context poll cadence in milliseconds.
    pub poll_ms: u64,
    /// Port for the Prometheus exporter; 0 disables it.
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            frame_count: 100,
            poll_ms: 50,
            metrics_port: 9090,
        }
    }
}

impl FileConfig {
    /// Reads and validates a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}
