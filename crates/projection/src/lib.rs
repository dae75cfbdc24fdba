//! Geodetic projection of polar radar scans.
//!
//! Maps each (ray, bin) sample of a scan to latitude/longitude/height using
//! the 4/3 effective-Earth-radius refraction model for beam height and full
//! spherical trigonometry for the surface position. This path favors
//! accuracy; the rasterizer uses its own intentionally cheaper local
//! linearization for sample placement.

pub mod geodetic;

pub use geodetic::{ground_ranges, max_ground_range, GeodeticProjector};
