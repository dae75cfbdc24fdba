//! Common types and utilities shared across the radar processing crates.

pub mod bbox;
pub mod channel;
pub mod error;
pub mod geo;
pub mod grid;
pub mod raster;
pub mod scan;
pub mod volume;

pub use bbox::BoundingBox;
pub use channel::Channel;
pub use error::{RadarError, RadarResult};
pub use grid::{GridSpec, PolarGrid};
pub use raster::{GeodeticField, Raster, NO_COVERAGE};
pub use scan::{PolarScan, SiteLocation};
pub use volume::{elevation_matches, ProcessedVolume, ELEVATION_TOLERANCE_DEG};
