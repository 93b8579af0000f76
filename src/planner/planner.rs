use chrono::{DateTime, Duration, Utc};

use crate::current::CurrentSampler;
use crate::navigation::GeoMath;
use crate::route::{RouteMode, ValidationError, Waypoint};

use super::abort::AbortFlag;
use super::collection::RouteCollection;
use super::error::PlanError;
use super::projector::{Projection, RouteProjector, DEFAULT_INTERVAL};

/// Spacing between staggered ETA departures.
pub const DEPARTURE_STAGGER: Duration = Duration::hours(1);

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub base_name: String,
    pub waypoints: Vec<Waypoint>,
    pub start_time: DateTime<Utc>,
    /// Speed through the water in knots.
    pub speed: f64,
}

pub fn dr_route_name(base: &str) -> String {
    format!("{}.DR", base)
}

pub fn eta_route_name(base: &str, departure: usize) -> String {
    format!("{}.{}.EP", base, departure)
}

/// Turns plan requests into committed routes.
pub struct Planner {
    geo: Box<dyn GeoMath>,
    sampler: Box<dyn CurrentSampler>,
    interval: Duration,
    abort: AbortFlag,
}

impl Planner {
    pub fn new(geo: Box<dyn GeoMath>, sampler: Box<dyn CurrentSampler>) -> Self {
        Self {
            geo,
            sampler,
            interval: DEFAULT_INTERVAL,
            abort: AbortFlag::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Handle the caller can trip to stop a projection before its next leg.
    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    /// Projects a dead-reckoning route and commits it as `{base}.DR`.
    pub fn plan_dr(
        &self,
        collection: &mut RouteCollection,
        request: &PlanRequest,
    ) -> Result<String, PlanError> {
        let name = dr_route_name(&request.base_name);
        self.run(collection, request, name, RouteMode::Dr, request.start_time)
    }

    /// Projects `departures` ETA routes, run `r` leaving `r` hours after the
    /// requested start and named `{base}.{r}.EP`.
    ///
    /// Runs are committed one at a time. The first failure stops the request;
    /// routes committed before it stay in the collection.
    pub fn plan_eta(
        &self,
        collection: &mut RouteCollection,
        request: &PlanRequest,
        departures: usize,
    ) -> Result<Vec<String>, PlanError> {
        if departures == 0 {
            return Err(ValidationError::NoDepartures.into());
        }

        let mut committed = Vec::with_capacity(departures);
        for r in 0..departures {
            let name = eta_route_name(&request.base_name, r);
            let start = request.start_time + DEPARTURE_STAGGER * r as i32;
            match self.run(collection, request, name, RouteMode::Eta, start) {
                Ok(name) => committed.push(name),
                Err(e) => {
                    if !committed.is_empty() {
                        log::warn!(
                            "Stopped after {} of {} departures; kept {}",
                            committed.len(),
                            departures,
                            committed.join(", ")
                        );
                    }
                    return Err(e);
                }
            }
        }
        Ok(committed)
    }

    fn run(
        &self,
        collection: &mut RouteCollection,
        request: &PlanRequest,
        name: String,
        mode: RouteMode,
        start_time: DateTime<Utc>,
    ) -> Result<String, PlanError> {
        if request.base_name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if collection.contains(&name) {
            return Err(ValidationError::DuplicateName(name).into());
        }

        let projection = Projection {
            name,
            mode,
            waypoints: &request.waypoints,
            start_time,
            speed: request.speed,
        };
        let record = RouteProjector::new(self.geo.as_ref(), self.sampler.as_ref())
            .with_interval(self.interval)
            .with_abort(&self.abort)
            .project(&projection)
            .inspect_err(|e| log::error!("Route {} failed: {}", projection.name, e))?;

        let name = record.name().to_string();
        collection.push(record)?;
        Ok(name)
    }
}
