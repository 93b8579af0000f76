mod error;
mod sampler;
mod table;

pub use error::{CurrentTableError, SamplerError};
pub use sampler::{CurrentSampler, NoCurrent, UniformCurrent};
pub use table::{CurrentTable, Station};
