//! Grid specifications: the polar ray/bin grid carried by scans and the
//! uniform lat/lon grid targeted by rasterization.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// A 2D float grid addressed as `[ray, bin]`, row-major with ray as the
/// slow axis. `NaN` means "no valid sample".
#[derive(Debug, Clone, PartialEq)]
pub struct PolarGrid {
    data: Vec<f32>,
    n_rays: usize,
    n_bins: usize,
}

impl PolarGrid {
    /// Create a grid from raw row-major samples.
    ///
    /// Returns `None` if the sample count does not match the dimensions.
    pub fn new(data: Vec<f32>, n_rays: usize, n_bins: usize) -> Option<Self> {
        if data.len() != n_rays * n_bins {
            return None;
        }
        Some(Self {
            data,
            n_rays,
            n_bins,
        })
    }

    /// Create a grid filled with a constant value.
    pub fn filled(value: f32, n_rays: usize, n_bins: usize) -> Self {
        Self {
            data: vec![value; n_rays * n_bins],
            n_rays,
            n_bins,
        }
    }

    pub fn n_rays(&self) -> usize {
        self.n_rays
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn is_empty(&self) -> bool {
        self.n_rays == 0 || self.n_bins == 0
    }

    #[inline]
    pub fn get(&self, ray: usize, bin: usize) -> f32 {
        self.data[ray * self.n_bins + bin]
    }

    #[inline]
    pub fn set(&mut self, ray: usize, bin: usize, value: f32) {
        self.data[ray * self.n_bins + bin] = value;
    }

    /// Raw samples in row-major order.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// One ray's bins as a slice.
    pub fn ray(&self, ray: usize) -> &[f32] {
        let start = ray * self.n_bins;
        &self.data[start..start + self.n_bins]
    }
}

/// Specification of a uniform target lat/lon raster.
///
/// Rows run north to south, columns west to east; pixel (0, 0) is the
/// north-west corner. Coordinates refer to pixel centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub width: usize,
    pub height: usize,
}

impl GridSpec {
    pub fn new(
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
            width,
            height,
        }
    }

    /// Build a grid spec covering a bounding box at the given pixel size.
    pub fn covering(bbox: &BoundingBox, width: usize, height: usize) -> Self {
        Self {
            lon_min: bbox.min_lon,
            lon_max: bbox.max_lon,
            lat_min: bbox.min_lat,
            lat_max: bbox.max_lat,
            width,
            height,
        }
    }

    /// Longitude degrees per pixel.
    pub fn lon_res(&self) -> f64 {
        (self.lon_max - self.lon_min) / self.width as f64
    }

    /// Latitude degrees per pixel.
    pub fn lat_res(&self) -> f64 {
        (self.lat_max - self.lat_min) / self.height as f64
    }

    /// Geographic center of pixel (x, y).
    pub fn pixel_center(&self, x: usize, y: usize) -> (f64, f64) {
        let lon = self.lon_min + (x as f64 + 0.5) * self.lon_res();
        let lat = self.lat_max - (y as f64 + 0.5) * self.lat_res();
        (lon, lat)
    }

    /// Fractional pixel coordinates of a geographic point, where integer
    /// values fall on pixel centers.
    pub fn to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        let px = (lon - self.lon_min) / self.lon_res() - 0.5;
        let py = (self.lat_max - lat) / self.lat_res() - 0.5;
        (px, py)
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.lon_min, self.lat_min, self.lon_max, self.lat_max)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_grid_dimension_check() {
        assert!(PolarGrid::new(vec![0.0; 12], 3, 4).is_some());
        assert!(PolarGrid::new(vec![0.0; 11], 3, 4).is_none());
    }

    #[test]
    fn test_polar_grid_indexing() {
        let mut grid = PolarGrid::filled(0.0, 2, 3);
        grid.set(1, 2, 7.5);
        assert_eq!(grid.get(1, 2), 7.5);
        assert_eq!(grid.ray(1), &[0.0, 0.0, 7.5]);
    }

    #[test]
    fn test_pixel_center_round_trip() {
        let spec = GridSpec::new(-91.0, -89.0, 39.0, 41.0, 4, 4);
        let (lon, lat) = spec.pixel_center(1, 2);
        let (px, py) = spec.to_pixel(lon, lat);
        assert!((px - 1.0).abs() < 1e-9);
        assert!((py - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rows_run_north_to_south() {
        let spec = GridSpec::new(-91.0, -89.0, 39.0, 41.0, 4, 4);
        let (_, lat_top) = spec.pixel_center(0, 0);
        let (_, lat_bottom) = spec.pixel_center(0, 3);
        assert!(lat_top > lat_bottom);
    }
}
