mod abort;
mod collection;
mod error;
#[allow(clippy::module_inception)]
mod planner;
mod projector;

pub use abort::AbortFlag;
pub use collection::RouteCollection;
pub use error::PlanError;
pub use planner::{dr_route_name, eta_route_name, PlanRequest, Planner, DEPARTURE_STAGGER};
pub use projector::{Projection, RouteProjector, DEFAULT_INTERVAL};
