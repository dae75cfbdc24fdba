//! Value-range thresholding.

use radar_common::PolarGrid;

use crate::ScanFilter;

/// Marks samples outside `[min, max]` as missing.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdFilter {
    min: f32,
    max: f32,
}

impl ThresholdFilter {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl ScanFilter for ThresholdFilter {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn apply(&self, grid: &mut PolarGrid) {
        for v in grid.samples_mut() {
            if *v < self.min || *v > self.max {
                *v = f32::NAN;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_marks_outliers() {
        let mut grid = PolarGrid::filled(10.0, 2, 3);
        grid.set(0, 0, -50.0);
        grid.set(1, 2, 120.0);

        ThresholdFilter::new(-32.0, 95.0).apply(&mut grid);

        assert!(grid.get(0, 0).is_nan());
        assert!(grid.get(1, 2).is_nan());
        assert_eq!(grid.get(0, 1), 10.0);
    }

    #[test]
    fn test_threshold_keeps_boundary_values() {
        let mut grid = PolarGrid::filled(0.0, 1, 2);
        grid.set(0, 0, -32.0);
        grid.set(0, 1, 95.0);

        ThresholdFilter::new(-32.0, 95.0).apply(&mut grid);

        assert_eq!(grid.get(0, 0), -32.0);
        assert_eq!(grid.get(0, 1), 95.0);
    }

    #[test]
    fn test_threshold_ignores_nan() {
        let mut grid = PolarGrid::filled(f32::NAN, 1, 2);
        ThresholdFilter::new(0.0, 1.0).apply(&mut grid);
        assert!(grid.get(0, 0).is_nan());
    }
}
