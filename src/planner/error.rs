use thiserror::Error;

use crate::current::SamplerError;
use crate::navigation::NavigationError;
use crate::route::ValidationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("a route needs at least two waypoints, got {0}")]
    EmptyRoute(usize),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("current unavailable: {0}")]
    SamplerUnavailable(#[from] SamplerError),
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),
    #[error("route needs more than {0} intermediate points")]
    TooManyFixes(usize),
    #[error("projection cancelled")]
    Cancelled,
}
