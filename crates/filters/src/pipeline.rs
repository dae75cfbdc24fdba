//! Filter trait and ordered pipeline.

use radar_common::{Channel, PolarGrid};
use tracing::debug;

use crate::{GaussianFilter, SpeckleRemovalFilter, ThresholdFilter};

/// A composable in-place transform over a polar grid.
pub trait ScanFilter: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Apply the transform in place.
    fn apply(&self, grid: &mut PolarGrid);
}

/// An ordered chain of filters applied to one channel grid.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn ScanFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn with(mut self, filter: impl ScanFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn push(&mut self, filter: Box<dyn ScanFilter>) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Apply every filter in order.
    pub fn apply(&self, grid: &mut PolarGrid) {
        if grid.is_empty() {
            return;
        }
        for filter in &self.filters {
            debug!(filter = filter.name(), "Applying filter");
            filter.apply(grid);
        }
    }
}

/// The production cleaning chain for a channel.
///
/// Reflectivity gets the full treatment; other channels are rasterized raw
/// because thresholding velocity or correlation fields discards real signal.
pub fn default_pipeline(channel: Channel) -> FilterPipeline {
    match channel {
        Channel::Reflectivity | Channel::TotalPower => {
            let (min, max) = channel.valid_range();
            FilterPipeline::new()
                .with(ThresholdFilter::new(min, max))
                .with(SpeckleRemovalFilter::new(5))
                .with(GaussianFilter::new(1.0, 2))
        }
        _ => FilterPipeline::new(),
    }
}
