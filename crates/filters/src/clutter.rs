//! Azimuthal-coherence clutter filter.

use radar_common::PolarGrid;

use crate::ScanFilter;

/// Flags azimuthally incoherent gates as clutter.
///
/// Ground clutter and interference vary sharply from ray to ray while
/// meteorological echo is smooth in azimuth. For each gate the filter looks
/// at a `window`-ray azimuthal neighborhood at the same range (wrapping) and
/// marks the gate missing when the neighborhood's standard deviation exceeds
/// the threshold.
#[derive(Debug, Clone, Copy)]
pub struct GateClutterFilter {
    window: usize,
    std_threshold: f32,
}

impl GateClutterFilter {
    pub fn new(window: usize, std_threshold: f32) -> Self {
        Self {
            window: window.max(3),
            std_threshold,
        }
    }
}

impl ScanFilter for GateClutterFilter {
    fn name(&self) -> &'static str {
        "gate_clutter"
    }

    fn apply(&self, grid: &mut PolarGrid) {
        let n_rays = grid.n_rays();
        let n_bins = grid.n_bins();
        if n_rays < self.window {
            return;
        }

        let snapshot = grid.clone();
        let half = self.window / 2;

        for ray in 0..n_rays {
            for bin in 0..n_bins {
                let mut sum = 0.0f64;
                let mut sum_sq = 0.0f64;
                let mut count = 0u32;

                for offset in 0..self.window {
                    let neighbor = (ray + n_rays + offset - half) % n_rays;
                    let v = snapshot.get(neighbor, bin);
                    if v.is_nan() {
                        continue;
                    }
                    sum += v as f64;
                    sum_sq += (v as f64) * (v as f64);
                    count += 1;
                }

                // Fewer than two valid neighbors says nothing about
                // coherence.
                if count < 2 {
                    continue;
                }

                let n = count as f64;
                let mean = sum / n;
                let variance = ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0);

                if variance.sqrt() > self.std_threshold as f64 {
                    grid.set(ray, bin, f32::NAN);
                }
            }
        }
    }
}
