//! In-place filters over the polar ray/bin grid.
//!
//! Each filter is a pure transform applied before rasterization to clean a
//! channel: despeckling, clutter suppression, smoothing. Filters never fail
//! on malformed input; bad samples become `NaN` and propagate as missing
//! data.

pub mod clutter;
pub mod gaussian;
pub mod median;
pub mod pipeline;
pub mod speckle;
pub mod threshold;

pub use clutter::GateClutterFilter;
pub use gaussian::GaussianFilter;
pub use median::{Median3Rays, Median5Bins};
pub use pipeline::{default_pipeline, FilterPipeline, ScanFilter};
pub use speckle::SpeckleRemovalFilter;
pub use threshold::ThresholdFilter;
