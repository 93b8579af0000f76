use geo::{Bearing, Destination, Distance, Haversine, Point, Rhumb};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::route::Position;

use super::vector::normalize_degrees;

pub const METRES_PER_NM: f64 = 1852.0;

/// Mean Earth radius in nautical miles, the sphere both geometries use.
pub const EARTH_RADIUS_NM: f64 = 6_371_008.8 / METRES_PER_NM;

/// Bearing (degrees true) and distance (NM) between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub bearing: f64,
    pub distance: f64,
}

pub trait GeoMath {
    fn distance_and_bearing(&self, from: Position, to: Position) -> Leg;
    fn destination_point(&self, from: Position, bearing: f64, distance: f64) -> Position;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Geometry {
    #[default]
    RhumbLine,
    GreatCircle,
}

impl Geometry {
    pub fn build(self) -> Box<dyn GeoMath> {
        match self {
            Geometry::RhumbLine => Box::new(RhumbLine),
            Geometry::GreatCircle => Box::new(GreatCircle),
        }
    }
}

/// Mercator sailing: constant bearing between the two points.
#[derive(Debug, Clone, Copy, Default)]
pub struct RhumbLine;

/// Spherical great circle, initial bearing.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircle;

fn point(position: Position) -> Point<f64> {
    Point::new(position.lon, position.lat)
}

fn position(point: Point<f64>) -> Position {
    let lon = normalize_degrees(point.x() + 180.0) - 180.0;
    Position::new(point.y(), if lon == -180.0 { 180.0 } else { lon })
}

fn leg(distance_m: f64, bearing: f64) -> Leg {
    let distance = distance_m / METRES_PER_NM;
    Leg {
        // identical points have no direction; report north
        bearing: if distance == 0.0 { 0.0 } else { normalize_degrees(bearing) },
        distance,
    }
}

impl GeoMath for RhumbLine {
    fn distance_and_bearing(&self, from: Position, to: Position) -> Leg {
        let (a, b) = (point(from), point(to));
        leg(Rhumb::distance(a, b), Rhumb::bearing(a, b))
    }

    fn destination_point(&self, from: Position, bearing: f64, distance: f64) -> Position {
        position(Rhumb::destination(point(from), bearing, distance * METRES_PER_NM))
    }
}

impl GeoMath for GreatCircle {
    fn distance_and_bearing(&self, from: Position, to: Position) -> Leg {
        let (a, b) = (point(from), point(to));
        leg(Haversine::distance(a, b), Haversine::bearing(a, b))
    }

    fn destination_point(&self, from: Position, bearing: f64, distance: f64) -> Position {
        position(Haversine::destination(point(from), bearing, distance * METRES_PER_NM))
    }
}
