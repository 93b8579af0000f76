use chrono::{DateTime, Utc};

use crate::route::{CurrentVector, Position};

use super::error::SamplerError;

/// Point source of tidal stream data.
///
/// Implementations block until they have an answer. Whatever they do
/// underneath (file lookup, a request/notification round trip with another
/// process) stays behind this call.
pub trait CurrentSampler {
    fn sample_current(
        &self,
        at: DateTime<Utc>,
        position: Position,
    ) -> Result<CurrentVector, SamplerError>;
}

/// Slack water everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCurrent;

impl CurrentSampler for NoCurrent {
    fn sample_current(&self, _at: DateTime<Utc>, _position: Position) -> Result<CurrentVector, SamplerError> {
        Ok(CurrentVector::slack())
    }
}

/// The same stream everywhere, at all times.
#[derive(Debug, Clone, Copy)]
pub struct UniformCurrent(pub CurrentVector);

impl CurrentSampler for UniformCurrent {
    fn sample_current(&self, _at: DateTime<Utc>, _position: Position) -> Result<CurrentVector, SamplerError> {
        Ok(self.0)
    }
}
