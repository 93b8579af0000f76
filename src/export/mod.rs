mod error;
pub mod gpx;
pub mod table;

pub use error::ExportError;
