use chrono::{DateTime, Duration, Utc};

use crate::current::CurrentSampler;
use crate::navigation::{course_to_steer, GeoMath, NavigationError, SpeedVector};
use crate::route::{
    CurrentVector, FixRole, Position, RouteBuilder, RouteMode, RouteRecord, ValidationError,
    Waypoint,
};

use super::abort::AbortFlag;
use super::error::PlanError;

/// Tolerance, in hours, when comparing arrival times against the next
/// synthetic point. Arrivals this close to a boundary count as arrivals.
const EPSILON_HOURS: f64 = 1e-9;

pub const DEFAULT_INTERVAL: Duration = Duration::hours(1);

/// Synthetic points allowed in one route before the projection gives up.
pub const MAX_SYNTHETIC_FIXES: usize = 100_000;

/// One projection request.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    pub name: String,
    pub mode: RouteMode,
    pub waypoints: &'a [Waypoint],
    pub start_time: DateTime<Utc>,
    /// Speed through the water in knots.
    pub speed: f64,
}

/// Walks a waypoint polyline and lays down a fix at every waypoint plus one
/// every `interval` of travel in between. The remainder of a partial interval
/// is carried over the waypoint into the next leg.
pub struct RouteProjector<'a> {
    geo: &'a dyn GeoMath,
    sampler: &'a dyn CurrentSampler,
    interval: Duration,
    abort: Option<&'a AbortFlag>,
}

impl<'a> RouteProjector<'a> {
    pub fn new(geo: &'a dyn GeoMath, sampler: &'a dyn CurrentSampler) -> Self {
        Self {
            geo,
            sampler,
            interval: DEFAULT_INTERVAL,
            abort: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_abort(mut self, abort: &'a AbortFlag) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn project(&self, projection: &Projection<'_>) -> Result<RouteRecord, PlanError> {
        validate(projection)?;

        let interval = hours(self.interval);
        if interval <= 0.0 {
            return Err(ValidationError::Interval.into());
        }

        let waypoints = projection.waypoints;
        let mut builder = RouteBuilder::new(projection.name.clone(), projection.mode);
        let mut clock = projection.start_time;
        // time left before the next synthetic point
        let mut budget = interval;
        // distance and bearing covered since the last fix
        let mut run: Option<(f64, f64)> = None;
        let mut vector = SpeedVector::new(0.0, projection.speed);
        let mut synthetic = 0usize;

        log::info!(
            "Projecting {} route {} over {} waypoints from {} at {:.1} kn",
            projection.mode,
            projection.name,
            waypoints.len(),
            projection.start_time,
            projection.speed
        );

        for pair in waypoints.windows(2) {
            if self.abort.is_some_and(|a| a.is_aborted()) {
                log::warn!("Projection of {} cancelled at {}", projection.name, pair[0].name);
                return Err(PlanError::Cancelled);
            }

            let (from, to) = (&pair[0], &pair[1]);
            let mut position = from.position;
            let mut leg = self.geo.distance_and_bearing(position, to.position);
            let (resolved, current) = if leg.distance == 0.0 {
                // repeated waypoint: no bearing to steer for, keep the last vector
                (vector, None)
            } else {
                self.resolve(projection, leg.bearing, clock, position)?
            };
            vector = resolved;

            builder.push(
                from.name.clone(),
                FixRole::Waypoint,
                clock,
                position,
                Some(vector.course),
                vector.speed,
                run.take(),
                current,
            );

            loop {
                let time_to_waypoint = leg.distance / vector.speed;

                if time_to_waypoint <= budget + EPSILON_HOURS {
                    budget -= time_to_waypoint;
                    if budget <= EPSILON_HOURS {
                        budget = interval;
                    }
                    clock += duration(time_to_waypoint);
                    run = Some((leg.distance, leg.bearing));
                    break;
                }

                synthetic += 1;
                if synthetic > MAX_SYNTHETIC_FIXES {
                    log::error!(
                        "Route {} still {:.1} NM short of {} after {} points",
                        projection.name,
                        leg.distance,
                        to.name,
                        MAX_SYNTHETIC_FIXES
                    );
                    return Err(PlanError::TooManyFixes(MAX_SYNTHETIC_FIXES));
                }

                let step = budget * vector.speed;
                position = self.geo.destination_point(position, leg.bearing, step);
                clock += duration(budget);
                let segment = (step, leg.bearing);
                budget = interval;

                leg = self.geo.distance_and_bearing(position, to.position);
                let (resolved, current) = self.resolve(projection, leg.bearing, clock, position)?;
                vector = resolved;

                let name = builder.next_synthetic_name();
                log::debug!(
                    "{} at {} ({:.4}, {:.4}), {:.1} NM to {}",
                    name,
                    clock,
                    position.lat,
                    position.lon,
                    leg.distance,
                    to.name
                );
                builder.push(
                    name,
                    FixRole::Hourly,
                    clock,
                    position,
                    Some(vector.course),
                    vector.speed,
                    Some(segment),
                    current,
                );
            }
        }

        let last = &waypoints[waypoints.len() - 1];
        builder.push(
            last.name.clone(),
            FixRole::Waypoint,
            clock,
            last.position,
            None,
            vector.speed,
            run.take(),
            None,
        );

        let record = builder.finish();
        log::info!(
            "Route {}: {:.1} NM in {:.1} h, arriving {}",
            record.name(),
            record.distance(),
            record.elapsed_hours(),
            record.end_time()
        );
        Ok(record)
    }

    /// Course and speed over ground leaving `position` at `at` along `bearing`.
    fn resolve(
        &self,
        projection: &Projection<'_>,
        bearing: f64,
        at: DateTime<Utc>,
        position: Position,
    ) -> Result<(SpeedVector, Option<CurrentVector>), PlanError> {
        match projection.mode {
            RouteMode::Dr => Ok((SpeedVector::new(bearing, projection.speed), None)),
            RouteMode::Eta => {
                let current = self.sampler.sample_current(at, position).inspect_err(|e| {
                    log::warn!("Route {}: {}", projection.name, e);
                })?;
                let vector = course_to_steer(bearing, projection.speed, current.set, current.rate)?;
                if vector.speed <= 0.0 {
                    return Err(NavigationError::NoProgress(vector.speed).into());
                }
                Ok((vector, Some(current)))
            }
        }
    }
}

fn validate(projection: &Projection<'_>) -> Result<(), PlanError> {
    if projection.name.trim().is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    if projection.waypoints.len() < 2 {
        return Err(PlanError::EmptyRoute(projection.waypoints.len()));
    }
    for waypoint in projection.waypoints {
        waypoint.validate()?;
    }
    if !projection.speed.is_finite() || projection.speed <= 0.0 {
        return Err(ValidationError::Speed(projection.speed).into());
    }
    Ok(())
}

fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

fn duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}
