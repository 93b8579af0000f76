use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    #[error("current of {rate:.2} kn setting {set:.0}° cannot be stemmed on a track of {track:.0}°")]
    CannotHoldTrack { track: f64, set: f64, rate: f64 },
    #[error("no speed through the water to steer against a current")]
    NoWaterSpeed,
    #[error("speed over ground is {0:.3} kn, the waypoint is never reached")]
    NoProgress(f64),
}
