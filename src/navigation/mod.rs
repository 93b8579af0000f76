mod error;
mod sailing;
mod vector;

pub use error::NavigationError;
pub use sailing::{GeoMath, Geometry, GreatCircle, Leg, RhumbLine, EARTH_RADIUS_NM, METRES_PER_NM};
pub use vector::{
    course_made_good, course_to_steer, normalize_degrees, resultant_over_ground, SpeedVector,
};
