//! Viewer tuning loaded from YAML.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`ViewerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Simulation and input tuning. Missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Simulation ticks per second.
    pub tick_rate_hz: u32,
    /// Distance walked or strafed per tick, in cells.
    pub walk_distance: f64,
    /// Turn and tilt angle applied per tick, in radians.
    pub turn_angle: f64,
    /// Radians of look per pixel of mouse motion.
    pub mouse_sensitivity: f64,
    /// Symmetric pitch clamp in radians. `None` leaves tilt unclamped.
    pub tilt_limit: Option<f64>,
    /// Capacity of the render-to-simulation action queue.
    pub queue_capacity: usize,
    /// How many whole periods the tick loop may lag before it resyncs.
    pub max_catch_up_ticks: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            walk_distance: 0.02,
            turn_angle: 0.03,
            mouse_sensitivity: 0.001,
            tilt_limit: None,
            queue_capacity: 256,
            max_catch_up_ticks: 5,
        }
    }
}

impl ViewerConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded viewer config");
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::Invalid("tick_rate_hz must be positive".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue_capacity must be positive".into(),
            ));
        }
        for (name, value) in [
            ("walk_distance", self.walk_distance),
            ("turn_angle", self.turn_angle),
            ("mouse_sensitivity", self.mouse_sensitivity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if let Some(limit) = self.tilt_limit {
            if !(limit.is_finite() && limit >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "tilt_limit must be non-negative, got {limit}"
                )));
            }
        }
        Ok(())
    }

    /// Length of one simulation tick.
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_rate_hz, 60);
        assert_eq!(config.tilt_limit, None);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = ViewerConfig::from_yaml("walk_distance: 0.05\n").unwrap();
        assert_eq!(config.walk_distance, 0.05);
        assert_eq!(config.turn_angle, ViewerConfig::default().turn_angle);
    }

    #[test]
    fn yaml_round_trip_with_tilt_limit() {
        let config = ViewerConfig {
            tilt_limit: Some(1.2),
            ..ViewerConfig::default()
        };
        let text = config.to_yaml().unwrap();
        assert_eq!(ViewerConfig::from_yaml(&text).unwrap(), config);
    }

    #[test]
    fn rejects_zero_tick_rate() {
        let err = ViewerConfig::from_yaml("tick_rate_hz: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_tilt_limit() {
        let err = ViewerConfig::from_yaml("tilt_limit: -0.5\n").unwrap_err();
        assert!(err.to_string().contains("tilt_limit"));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = ViewerConfig::from_yaml("tick_rate_hz: [1, 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn tick_period_matches_rate() {
        let config = ViewerConfig::default();
        let period = config.tick_period();
        assert!((period.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(&path, "mouse_sensitivity: 0.002\n").unwrap();
        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.mouse_sensitivity, 0.002);
    }
}
