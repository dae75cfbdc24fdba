//! Median filters along the azimuth and range axes.

use radar_common::PolarGrid;

use crate::ScanFilter;

/// Median of the valid values in a small window; `NaN` if none are valid.
fn median_of(window: &mut Vec<f32>) -> f32 {
    window.retain(|v| !v.is_nan());
    if window.is_empty() {
        return f32::NAN;
    }
    window.sort_by(|a, b| a.partial_cmp(b).unwrap());
    window[window.len() / 2]
}

/// Replaces each sample with the median of itself and its two
/// azimuthally-adjacent rays. The ray axis wraps since azimuth is circular.
#[derive(Debug, Clone, Copy, Default)]
pub struct Median3Rays;

impl ScanFilter for Median3Rays {
    fn name(&self) -> &'static str {
        "median3_rays"
    }

    fn apply(&self, grid: &mut PolarGrid) {
        let n_rays = grid.n_rays();
        let n_bins = grid.n_bins();
        if n_rays < 3 {
            return;
        }

        let snapshot = grid.clone();
        let mut window = Vec::with_capacity(3);
        for ray in 0..n_rays {
            let prev = (ray + n_rays - 1) % n_rays;
            let next = (ray + 1) % n_rays;
            for bin in 0..n_bins {
                window.clear();
                window.push(snapshot.get(prev, bin));
                window.push(snapshot.get(ray, bin));
                window.push(snapshot.get(next, bin));
                grid.set(ray, bin, median_of(&mut window));
            }
        }
    }
}

/// Replaces each sample with the median of a five-bin range window.
///
/// The range axis does not wrap, so the two outermost bins on each side are
/// left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Median5Bins;

impl ScanFilter for Median5Bins {
    fn name(&self) -> &'static str {
        "median5_bins"
    }

    fn apply(&self, grid: &mut PolarGrid) {
        let n_rays = grid.n_rays();
        let n_bins = grid.n_bins();
        if n_bins < 5 {
            return;
        }

        let snapshot = grid.clone();
        let mut window = Vec::with_capacity(5);
        for ray in 0..n_rays {
            for bin in 2..n_bins - 2 {
                window.clear();
                for b in bin - 2..=bin + 2 {
                    window.push(snapshot.get(ray, b));
                }
                grid.set(ray, bin, median_of(&mut window));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median3_suppresses_single_ray_spike() {
        let mut grid = PolarGrid::filled(10.0, 6, 4);
        grid.set(2, 1, 80.0);

        Median3Rays.apply(&mut grid);

        assert_eq!(grid.get(2, 1), 10.0);
    }

    #[test]
    fn test_median3_wraps_across_ray_zero() {
        let mut grid = PolarGrid::filled(10.0, 4, 2);
        // Rays 3 and 1 surround ray 0; spike them both and ray 0 follows.
        grid.set(3, 0, 50.0);
        grid.set(1, 0, 50.0);

        Median3Rays.apply(&mut grid);

        assert_eq!(grid.get(0, 0), 50.0);
    }

    #[test]
    fn test_median3_all_nan_stays_nan() {
        let mut grid = PolarGrid::filled(f32::NAN, 6, 4);
        Median3Rays.apply(&mut grid);
        assert!(grid.samples().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_median5_suppresses_single_bin_spike() {
        let mut grid = PolarGrid::filled(10.0, 2, 9);
        grid.set(0, 4, 80.0);

        Median5Bins.apply(&mut grid);

        assert_eq!(grid.get(0, 4), 10.0);
    }

    #[test]
    fn test_median5_leaves_edge_bins_untouched() {
        let mut grid = PolarGrid::filled(10.0, 2, 9);
        grid.set(0, 0, 80.0);
        grid.set(0, 8, 80.0);

        Median5Bins.apply(&mut grid);

        assert_eq!(grid.get(0, 0), 80.0);
        assert_eq!(grid.get(0, 8), 80.0);
    }

    #[test]
    fn test_median5_short_grid_is_noop() {
        let mut grid = PolarGrid::filled(10.0, 2, 4);
        let before = grid.clone();
        Median5Bins.apply(&mut grid);
        assert_eq!(grid, before);
    }
}
