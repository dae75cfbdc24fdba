//! Inverse-distance-weighted rasterization of polar scans.
//!
//! Splats each (ray, bin) sample onto a uniform lat/lon grid and classifies
//! every output pixel three ways: averaged value, `NaN` (inside coverage, no
//! data) or the [`radar_common::raster::NO_COVERAGE`] sentinel (outside
//! radar coverage). Sample placement uses a cheap local linearization of the
//! site geometry; the coverage bounds come from the exact geodetic
//! projection. The two approximations are intentionally different and must
//! not be unified.

pub mod idw;

pub use idw::{rasterize, rasterize_with, IdwRasterizer, RasterizeParams};
