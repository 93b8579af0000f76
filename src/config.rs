use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::navigation::Geometry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid interval {value:?}: {message}")]
    Interval { value: String, message: String },
    #[error("default speed must be positive, got {0}")]
    Speed(f64),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Knots, used when a request gives no usable speed.
    #[serde(default = "default_speed")]
    pub default_speed: f64,
    /// Spacing of synthetic points, e.g. "1h" or "30m".
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default)]
    pub geometry: Geometry,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            default_speed: default_speed(),
            interval: default_interval(),
            geometry: Geometry::default(),
        }
    }
}

fn default_speed() -> f64 {
    5.0
}

fn default_interval() -> String {
    "1h".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_base_folder")]
    pub base_folder: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            base_folder: default_base_folder(),
        }
    }
}

fn default_base_folder() -> PathBuf {
    PathBuf::from("routes")
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.interval()?;
        let speed = config.planner.default_speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::Speed(speed));
        }
        Ok(config)
    }

    pub fn interval(&self) -> Result<chrono::Duration, ConfigError> {
        let value = &self.planner.interval;
        let invalid = |message: String| ConfigError::Interval {
            value: value.clone(),
            message,
        };

        let std = humantime::parse_duration(value.trim()).map_err(|e| invalid(e.to_string()))?;
        let interval = chrono::Duration::from_std(std).map_err(|e| invalid(e.to_string()))?;
        if interval <= chrono::Duration::zero() {
            return Err(invalid("must be positive".to_string()));
        }
        Ok(interval)
    }

    /// The requested speed when it is a positive number, the configured
    /// default otherwise.
    pub fn speed_or_default(&self, requested: Option<f64>) -> f64 {
        match requested {
            Some(speed) if speed.is_finite() && speed > 0.0 => speed,
            Some(speed) => {
                log::warn!(
                    "Ignoring speed {}, using default {} kn",
                    speed,
                    self.planner.default_speed
                );
                self.planner.default_speed
            }
            None => self.planner.default_speed,
        }
    }
}
