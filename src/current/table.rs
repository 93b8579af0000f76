use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::navigation::{GeoMath, RhumbLine};
use crate::route::{CurrentVector, Position};

use super::error::{CurrentTableError, SamplerError};
use super::sampler::CurrentSampler;

const DEFAULT_INTERVAL: &str = "1h";
const DEFAULT_MAX_DISTANCE_NM: f64 = 30.0;

#[derive(Debug, Deserialize)]
struct TableFile {
    start: DateTime<Utc>,
    #[serde(default = "default_interval")]
    interval: String,
    #[serde(default = "default_max_distance")]
    max_distance: f64,
    stations: Vec<StationFile>,
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

fn default_max_distance() -> f64 {
    DEFAULT_MAX_DISTANCE_NM
}

#[derive(Debug, Deserialize)]
struct StationFile {
    name: String,
    lat: f64,
    lon: f64,
    samples: Vec<CurrentVector>,
}

#[derive(Debug, Clone)]
pub struct Station {
    pub name: String,
    pub position: Position,
    /// One sample per interval, starting at the table's start time.
    pub samples: Vec<CurrentVector>,
}

/// Tidal stream predictions at fixed stations, one sample per interval.
///
/// A query is answered by the nearest station within `max_distance` using
/// the slot that contains the requested time.
#[derive(Debug, Clone)]
pub struct CurrentTable {
    start: DateTime<Utc>,
    interval: Duration,
    max_distance: f64,
    stations: Vec<Station>,
}

impl CurrentTable {
    pub fn new(
        start: DateTime<Utc>,
        interval: Duration,
        max_distance: f64,
        stations: Vec<Station>,
    ) -> Result<Self, CurrentTableError> {
        if interval < Duration::milliseconds(1) {
            return Err(CurrentTableError::Interval("must be at least 1ms".into()));
        }
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(CurrentTableError::MaxDistance(max_distance));
        }
        if stations.is_empty() {
            return Err(CurrentTableError::NoStations);
        }
        for station in &stations {
            if !station.position.is_valid() {
                return Err(CurrentTableError::Station {
                    name: station.name.clone(),
                    message: "position out of range".into(),
                });
            }
            if let Some(bad) = station.samples.iter().find(|s| s.rate < 0.0 || !s.rate.is_finite() || !s.set.is_finite()) {
                return Err(CurrentTableError::Station {
                    name: station.name.clone(),
                    message: format!("invalid sample {:?}", bad),
                });
            }
        }

        Ok(Self {
            start,
            interval,
            max_distance,
            stations,
        })
    }

    pub fn from_str(yaml: &str) -> Result<Self, CurrentTableError> {
        let file: TableFile = serde_yaml::from_str(yaml)?;
        let interval = humantime::parse_duration(file.interval.trim())
            .map_err(|e| CurrentTableError::Interval(e.to_string()))
            .and_then(|d| Duration::from_std(d).map_err(|e| CurrentTableError::Interval(e.to_string())))?;

        let stations = file
            .stations
            .into_iter()
            .map(|s| Station {
                name: s.name,
                position: Position::new(s.lat, s.lon),
                samples: s.samples,
            })
            .collect();

        Self::new(file.start, interval, file.max_distance, stations)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CurrentTableError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_str(&content)?;
        log::info!(
            "Loaded current table {} ({} stations from {})",
            path.display(),
            table.stations.len(),
            table.start
        );
        Ok(table)
    }

    fn slot(&self, at: DateTime<Utc>) -> Option<usize> {
        if at < self.start {
            return None;
        }
        let elapsed = (at - self.start).num_milliseconds();
        let step = self.interval.num_milliseconds();
        usize::try_from(elapsed / step).ok()
    }

    fn nearest(&self, position: Position) -> Option<&Station> {
        let mut best: Option<(&Station, f64)> = None;
        for station in &self.stations {
            let distance = RhumbLine.distance_and_bearing(position, station.position).distance;
            if distance > self.max_distance {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((station, distance));
            }
        }
        best.map(|(station, _)| station)
    }
}

impl CurrentSampler for CurrentTable {
    fn sample_current(&self, at: DateTime<Utc>, position: Position) -> Result<CurrentVector, SamplerError> {
        let unavailable = SamplerError::Unavailable { at, position };

        let slot = self.slot(at).ok_or_else(|| unavailable.clone())?;
        let station = self.nearest(position).ok_or_else(|| unavailable.clone())?;
        let sample = station.samples.get(slot).copied().ok_or(unavailable)?;

        log::trace!(
            "current at {} from station {} slot {}: {:.0}° {:.2} kn",
            at,
            station.name,
            slot,
            sample.set,
            sample.rate
        );
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    const TABLE: &str = r#"
start: 2024-01-01T00:00:00Z
interval: 1h
max_distance: 20
stations:
  - name: West
    lat: 50.0
    lon: -2.0
    samples:
      - { set: 90, rate: 1.0 }
      - { set: 95, rate: 1.5 }
      - { set: 270, rate: 0.5 }
  - name: East
    lat: 50.0
    lon: -1.0
    samples:
      - { set: 180, rate: 2.0 }
"#;

    #[fixture]
    fn table() -> CurrentTable {
        CurrentTable::from_str(TABLE).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[rstest]
    #[case(at(0, 0), CurrentVector::new(90.0, 1.0))]
    #[case(at(0, 59), CurrentVector::new(90.0, 1.0))]
    #[case(at(1, 0), CurrentVector::new(95.0, 1.5))]
    #[case(at(2, 30), CurrentVector::new(270.0, 0.5))]
    fn picks_hourly_slot(table: CurrentTable, #[case] when: DateTime<Utc>, #[case] expected: CurrentVector) {
        let sample = table.sample_current(when, Position::new(50.05, -1.95)).unwrap();
        assert_eq!(sample, expected);
    }

    #[rstest]
    fn picks_nearest_station(table: CurrentTable) {
        let sample = table.sample_current(at(0, 10), Position::new(50.0, -1.1)).unwrap();
        assert_eq!(sample, CurrentVector::new(180.0, 2.0));
    }

    #[rstest]
    #[case(Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap(), Position::new(50.0, -2.0))]
    #[case(at(3, 0), Position::new(50.0, -2.0))]
    #[case(at(1, 0), Position::new(50.0, -1.0))]
    #[case(at(0, 0), Position::new(45.0, -2.0))]
    fn unavailable_outside_coverage(table: CurrentTable, #[case] when: DateTime<Utc>, #[case] position: Position) {
        assert_eq!(
            table.sample_current(when, position),
            Err(SamplerError::Unavailable { at: when, position })
        );
    }

    #[test]
    fn interval_is_parsed_with_humantime() {
        let yaml = TABLE.replace("interval: 1h", "interval: 30m");
        let table = CurrentTable::from_str(&yaml).unwrap();
        let sample = table.sample_current(at(0, 45), Position::new(50.0, -2.0)).unwrap();
        assert_eq!(sample, CurrentVector::new(95.0, 1.5));
    }

    #[test]
    fn rejects_empty_and_bad_tables() {
        let empty = "start: 2024-01-01T00:00:00Z\nstations: []\n";
        assert!(matches!(CurrentTable::from_str(empty), Err(CurrentTableError::NoStations)));

        let bad_interval = TABLE.replace("interval: 1h", "interval: soon");
        assert!(matches!(
            CurrentTable::from_str(&bad_interval),
            Err(CurrentTableError::Interval(_))
        ));

        let sub_millisecond = TABLE.replace("interval: 1h", "interval: 500us");
        assert!(matches!(
            CurrentTable::from_str(&sub_millisecond),
            Err(CurrentTableError::Interval(_))
        ));

        let negative = TABLE.replace("rate: 2.0", "rate: -2.0");
        assert!(matches!(
            CurrentTable::from_str(&negative),
            Err(CurrentTableError::Station { .. })
        ));
    }

    #[rstest]
    #[case("max_distance: -5")]
    #[case("max_distance: .nan")]
    #[case("max_distance: .inf")]
    fn rejects_bad_search_radius(#[case] line: &str) {
        let yaml = TABLE.replace("max_distance: 20", line);
        assert!(matches!(
            CurrentTable::from_str(&yaml),
            Err(CurrentTableError::MaxDistance(_))
        ));
    }
}
