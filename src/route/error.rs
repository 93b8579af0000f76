use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("waypoint {name}: latitude {lat} outside [-90, 90]")]
    Latitude { name: String, lat: f64 },
    #[error("waypoint {name}: longitude {lon} outside [-180, 180]")]
    Longitude { name: String, lon: f64 },
    #[error("route name is empty")]
    EmptyName,
    #[error("route name already exists: {0}")]
    DuplicateName(String),
    #[error("planned speed must be a positive number of knots, got {0}")]
    Speed(f64),
    #[error("synthetic point interval must be positive")]
    Interval,
    #[error("number of departures must be at least one")]
    NoDepartures,
}

#[derive(Debug, Error)]
pub enum RouteFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid waypoint: {0}")]
    Invalid(#[from] ValidationError),
    #[error("a route needs at least two waypoints, found {0}")]
    TooFewWaypoints(usize),
}
