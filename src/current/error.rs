use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::route::Position;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("no current data for {at} at {:.4}, {:.4}", .position.lat, .position.lon)]
    Unavailable { at: DateTime<Utc>, position: Position },
}

#[derive(Debug, Error)]
pub enum CurrentTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid interval: {0}")]
    Interval(String),
    #[error("station search radius must be a non-negative number of NM, got {0}")]
    MaxDistance(f64),
    #[error("current table has no stations")]
    NoStations,
    #[error("station {name}: {message}")]
    Station { name: String, message: String },
}
