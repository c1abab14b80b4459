//! Engine tuning constants.
//!
//! The fallback spacing and drift speed are not derived from tempo or
//! note spacing; hosts that know better can override them.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default visual spacing assumed per beat in estimating mode (px).
pub const DEFAULT_ESTIMATE_SPACING_PX: f64 = 80.0;
/// Default drift speed when the current beat has no bounds (px/s).
pub const DEFAULT_DRIFT_SPEED_PX_PER_SEC: f64 = 40.0;
/// Assumed time between two sync ticks (s).
pub const DEFAULT_FRAME_DELTA_SEC: f64 = 1.0 / 60.0;
/// Maximum successors inspected when looking for the next visible beat.
pub const DEFAULT_MAX_LOOKAHEAD: usize = 10;
/// Cursor height before any beat has been resolved (px).
pub const DEFAULT_CURSOR_HEIGHT: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub estimate_spacing_px: f64,
    pub drift_speed_px_per_sec: f64,
    pub frame_delta_sec: f64,
    pub max_lookahead: usize,
    pub default_cursor_height: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            estimate_spacing_px: DEFAULT_ESTIMATE_SPACING_PX,
            drift_speed_px_per_sec: DEFAULT_DRIFT_SPEED_PX_PER_SEC,
            frame_delta_sec: DEFAULT_FRAME_DELTA_SEC,
            max_lookahead: DEFAULT_MAX_LOOKAHEAD,
            default_cursor_height: DEFAULT_CURSOR_HEIGHT,
        }
    }
}

impl SyncConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("estimate_spacing_px", self.estimate_spacing_px),
            ("drift_speed_px_per_sec", self.drift_speed_px_per_sec),
            ("frame_delta_sec", self.frame_delta_sec),
            ("default_cursor_height", self.default_cursor_height),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Horizontal distance the cursor drifts in one assumed frame.
    pub fn drift_step_px(&self) -> f64 {
        self.drift_speed_px_per_sec * self.frame_delta_sec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = SyncConfig::from_json("{}").unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.max_lookahead, 10);
    }

    #[test]
    fn partial_override() {
        let config = SyncConfig::from_json(r#"{"estimate_spacing_px": 120.0}"#).unwrap();
        assert_eq!(config.estimate_spacing_px, 120.0);
        assert_eq!(config.drift_speed_px_per_sec, DEFAULT_DRIFT_SPEED_PX_PER_SEC);
    }

    #[test]
    fn negative_values_rejected() {
        let err = SyncConfig::from_json(r#"{"drift_speed_px_per_sec": -5.0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { field: "drift_speed_px_per_sec", .. }
        ));
    }

    #[test]
    fn drift_step_is_speed_times_frame() {
        let config = SyncConfig::default();
        assert!((config.drift_step_px() - 40.0 / 60.0).abs() < 1e-12);
    }
}
