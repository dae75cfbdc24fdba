//! Derived grid products: the geocoded polar field and the output raster.

use crate::{BoundingBox, GridSpec};

/// Sentinel marking a raster pixel as outside radar coverage.
///
/// Distinct from `NaN`, which means "inside coverage but no valid sample".
/// Rendering blocks sentinel pixels opaque and leaves `NaN` pixels
/// transparent.
pub const NO_COVERAGE: f32 = -9999.0;

/// Whether a raster value is the out-of-coverage sentinel.
#[inline]
pub fn is_no_coverage(value: f32) -> bool {
    value == NO_COVERAGE
}

/// Geocoded coordinates for every (ray, bin) sample of one scan, plus the
/// scan's geographic bounding box.
///
/// Computed once per scan and cached on it; immutable thereafter.
#[derive(Debug, Clone)]
pub struct GeodeticField {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    height: Vec<f64>,
    n_rays: usize,
    n_bins: usize,
    bbox: BoundingBox,
}

impl GeodeticField {
    pub fn new(
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        height: Vec<f64>,
        n_rays: usize,
        n_bins: usize,
        bbox: BoundingBox,
    ) -> Self {
        debug_assert_eq!(latitude.len(), n_rays * n_bins);
        debug_assert_eq!(longitude.len(), n_rays * n_bins);
        debug_assert_eq!(height.len(), n_rays * n_bins);
        Self {
            latitude,
            longitude,
            height,
            n_rays,
            n_bins,
            bbox,
        }
    }

    #[inline]
    pub fn latitude(&self, ray: usize, bin: usize) -> f64 {
        self.latitude[ray * self.n_bins + bin]
    }

    #[inline]
    pub fn longitude(&self, ray: usize, bin: usize) -> f64 {
        self.longitude[ray * self.n_bins + bin]
    }

    #[inline]
    pub fn height(&self, ray: usize, bin: usize) -> f64 {
        self.height[ray * self.n_bins + bin]
    }

    pub fn n_rays(&self) -> usize {
        self.n_rays
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Exact geographic bounding box of all samples.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

/// Output of rasterization: a uniform lat/lon grid of values plus each
/// pixel's geocoded center.
///
/// Values are three-way classified: finite = averaged data, `NaN` = inside
/// coverage but no data, [`NO_COVERAGE`] = outside radar coverage.
#[derive(Debug, Clone)]
pub struct Raster {
    pub spec: GridSpec,
    /// Row-major `height x width` values.
    pub values: Vec<f32>,
    /// Per-pixel center latitude, row-major.
    pub latitude: Vec<f64>,
    /// Per-pixel center longitude, row-major.
    pub longitude: Vec<f64>,
}

impl Raster {
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.spec.width + x]
    }

    #[inline]
    pub fn latitude_at(&self, x: usize, y: usize) -> f64 {
        self.latitude[y * self.spec.width + x]
    }

    #[inline]
    pub fn longitude_at(&self, x: usize, y: usize) -> f64 {
        self.longitude[y * self.spec.width + x]
    }

    pub fn width(&self) -> usize {
        self.spec.width
    }

    pub fn height(&self) -> usize {
        self.spec.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_not_nan() {
        assert!(!NO_COVERAGE.is_nan());
        assert!(is_no_coverage(NO_COVERAGE));
        assert!(!is_no_coverage(f32::NAN));
        assert!(!is_no_coverage(0.0));
    }
}
