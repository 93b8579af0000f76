use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    #[serde(flatten)]
    pub position: Position,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            position: Position::new(lat, lon),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let Position { lat, lon } = self.position;
        if !lat.is_finite() || lat.abs() > 90.0 {
            return Err(ValidationError::Latitude {
                name: self.name.clone(),
                lat,
            });
        }
        if !lon.is_finite() || lon.abs() > 180.0 {
            return Err(ValidationError::Longitude {
                name: self.name.clone(),
                lon,
            });
        }
        Ok(())
    }
}

/// Set (degrees true, the direction the stream flows toward) and rate (knots).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentVector {
    pub set: f64,
    pub rate: f64,
}

impl CurrentVector {
    pub fn new(set: f64, rate: f64) -> Self {
        Self { set, rate }
    }

    pub fn slack() -> Self {
        Self { set: 0.0, rate: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
pub enum FixRole {
    Waypoint,
    Hourly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum RouteMode {
    #[serde(rename = "DR")]
    #[strum(serialize = "DR")]
    Dr,
    #[serde(rename = "ETA")]
    #[strum(serialize = "ETA")]
    Eta,
}

impl RouteMode {
    /// Prefix for synthetic points: dead-reckoning or estimated positions.
    pub fn point_prefix(&self) -> &'static str {
        match self {
            RouteMode::Dr => "DR",
            RouteMode::Eta => "EP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub id: Uuid,
    pub name: String,
    pub role: FixRole,
    pub time: DateTime<Utc>,
    pub position: Position,
    /// Course to steer leaving this fix; `None` at the end of the route.
    pub course: Option<f64>,
    pub speed_over_ground: f64,
    /// Distance run from the previous fix; `None` on the first fix.
    pub leg_distance: Option<f64>,
    pub leg_bearing: Option<f64>,
    /// Cumulative distance from the start of the route.
    pub distance_run: f64,
    pub current: Option<CurrentVector>,
}

/// A projected route. Only the projector builds these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    id: Uuid,
    name: String,
    mode: RouteMode,
    start: String,
    end: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    elapsed_hours: f64,
    distance: f64,
    fixes: Vec<Fix>,
}

impl RouteRecord {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn elapsed_hours(&self) -> f64 {
        self.elapsed_hours
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            name: self.name.clone(),
            mode: self.mode,
            start: self.start.clone(),
            end: self.end.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            elapsed_hours: self.elapsed_hours,
            distance: self.distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub name: String,
    pub mode: RouteMode,
    pub start: String,
    pub end: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub elapsed_hours: f64,
    pub distance: f64,
}

/// Accumulates fixes during a projection run.
pub(crate) struct RouteBuilder {
    name: String,
    mode: RouteMode,
    fixes: Vec<Fix>,
    distance_run: f64,
    synthetic_count: usize,
}

impl RouteBuilder {
    pub(crate) fn new(name: impl Into<String>, mode: RouteMode) -> Self {
        Self {
            name: name.into(),
            mode,
            fixes: Vec::new(),
            distance_run: 0.0,
            synthetic_count: 0,
        }
    }

    pub(crate) fn next_synthetic_name(&mut self) -> String {
        self.synthetic_count += 1;
        format!("{}{}", self.mode.point_prefix(), self.synthetic_count)
    }

    /// Appends a fix; `run` is the distance and bearing covered since the previous one.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn push(
        &mut self,
        name: String,
        role: FixRole,
        time: DateTime<Utc>,
        position: Position,
        course: Option<f64>,
        speed_over_ground: f64,
        run: Option<(f64, f64)>,
        current: Option<CurrentVector>,
    ) {
        if let Some((distance, _)) = run {
            self.distance_run += distance;
        }
        self.fixes.push(Fix {
            id: Uuid::new_v4(),
            name,
            role,
            time,
            position,
            course,
            speed_over_ground,
            leg_distance: run.map(|(distance, _)| distance),
            leg_bearing: run.map(|(_, bearing)| bearing),
            distance_run: self.distance_run,
            current,
        });
    }

    /// Seals the record. Callers guarantee at least a start and an end fix.
    pub(crate) fn finish(self) -> RouteRecord {
        let first = &self.fixes[0];
        let last = &self.fixes[self.fixes.len() - 1];
        let start_time = first.time;
        let end_time = last.time;
        let elapsed_hours = (end_time - start_time).num_milliseconds() as f64 / 3_600_000.0;

        RouteRecord {
            id: Uuid::new_v4(),
            start: first.name.clone(),
            end: last.name.clone(),
            start_time,
            end_time,
            elapsed_hours,
            distance: self.distance_run,
            name: self.name,
            mode: self.mode,
            fixes: self.fixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn waypoint_range_checks() {
        assert!(Waypoint::new("ok", 90.0, -180.0).validate().is_ok());
        assert_eq!(
            Waypoint::new("north", 91.0, 0.0).validate(),
            Err(ValidationError::Latitude {
                name: "north".into(),
                lat: 91.0
            })
        );
        assert!(matches!(
            Waypoint::new("east", 0.0, 181.0).validate(),
            Err(ValidationError::Longitude { .. })
        ));
        assert!(Waypoint::new("nan", f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn mode_strings() {
        assert_eq!(RouteMode::Dr.to_string(), "DR");
        assert_eq!("ETA".parse::<RouteMode>().unwrap(), RouteMode::Eta);
        assert_eq!(serde_json::to_string(&RouteMode::Eta).unwrap(), "\"ETA\"");
    }

    #[test]
    fn builder_accumulates_distance_and_labels() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut builder = RouteBuilder::new("test.DR", RouteMode::Dr);
        builder.push("A".into(), FixRole::Waypoint, t0, Position::new(0.0, 0.0), Some(90.0), 5.0, None, None);
        let name = builder.next_synthetic_name();
        assert_eq!(name, "DR1");
        builder.push(
            name,
            FixRole::Hourly,
            t0 + chrono::Duration::hours(1),
            Position::new(0.0, 0.08),
            Some(90.0),
            5.0,
            Some((5.0, 90.0)),
            None,
        );
        builder.push(
            "B".into(),
            FixRole::Waypoint,
            t0 + chrono::Duration::minutes(90),
            Position::new(0.0, 0.12),
            None,
            5.0,
            Some((2.5, 90.0)),
            None,
        );

        let record = builder.finish();
        assert_eq!(record.start(), "A");
        assert_eq!(record.end(), "B");
        assert_eq!(record.distance(), 7.5);
        assert_eq!(record.elapsed_hours(), 1.5);
        assert_eq!(record.fixes()[2].distance_run, 7.5);
        assert_eq!(record.fixes()[0].leg_distance, None);
        assert_eq!(record.summary().mode, RouteMode::Dr);
    }
}
