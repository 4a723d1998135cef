use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pixels drawn per second of interval time.
pub const PIXELS_PER_SECOND: f64 = 0.2;
/// Height of one table row in pixels.
pub const ROW_HEIGHT: f64 = 24.0;
/// Width, in seconds, of the placeholder cells at both window edges.
pub const BUFFER_SECS: f64 = 120.0;
/// Scroll deltas at or below this many pixels are treated as sync echo.
pub const SCROLL_NOISE_PX: f64 = 5.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

/// Geometry and interaction tuning for the workflow table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowDisplayConfig {
    pub pixels_per_second: f64,
    pub row_height: f64,
    pub buffer_secs: f64,
    pub scroll_noise_px: f64,
    pub horizontal_overscan_px: f64,
    pub time_axis_height: f64,
    /// Offset applied to axis ticks so they line up with the day boundary
    /// overlay.
    pub axis_margin_px: f64,
}

impl Default for WorkflowDisplayConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: PIXELS_PER_SECOND,
            row_height: ROW_HEIGHT,
            buffer_secs: BUFFER_SECS,
            scroll_noise_px: SCROLL_NOISE_PX,
            horizontal_overscan_px: 100.0,
            time_axis_height: 24.0,
            axis_margin_px: 1.5,
        }
    }
}

impl WorkflowDisplayConfig {
    /// Load from JSON; missing keys fall back to the defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("pixelsPerSecond", self.pixels_per_second),
            ("rowHeight", self.row_height),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
