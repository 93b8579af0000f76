mod error;
mod parsing;
mod types;

pub use error::{RouteFileError, ValidationError};
pub use parsing::RoutePlan;
pub(crate) use types::RouteBuilder;
pub use types::{CurrentVector, Fix, FixRole, Position, RouteMode, RouteRecord, RouteSummary, Waypoint};
