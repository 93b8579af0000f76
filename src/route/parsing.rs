use std::path::Path;

use serde::Deserialize;

use super::error::RouteFileError;
use super::types::Waypoint;

/// A waypoint file: an optional route name and the ordered polyline.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutePlan {
    #[serde(default)]
    pub name: Option<String>,
    pub waypoints: Vec<Waypoint>,
}

impl RoutePlan {
    pub fn from_str(yaml: &str) -> Result<Self, RouteFileError> {
        let plan: RoutePlan = serde_yaml::from_str(yaml)?;
        plan.check()?;
        Ok(plan)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RouteFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    fn check(&self) -> Result<(), RouteFileError> {
        if self.waypoints.len() < 2 {
            return Err(RouteFileError::TooFewWaypoints(self.waypoints.len()));
        }
        for waypoint in &self.waypoints {
            waypoint.validate()?;
        }
        Ok(())
    }
}
