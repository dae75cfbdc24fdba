//! Separable Gaussian smoothing.

use radar_common::PolarGrid;

use crate::ScanFilter;

/// Separable 1D Gaussian blur: an azimuthal pass (wrapping) followed by a
/// range pass (clamped at the edges).
///
/// Missing samples keep their `NaN`; around them the kernel is renormalized
/// over the valid taps so gaps neither spread nor bias their neighborhood.
#[derive(Debug, Clone)]
pub struct GaussianFilter {
    kernel: Vec<f32>,
    radius: usize,
}

impl GaussianFilter {
    pub fn new(sigma: f32, radius: usize) -> Self {
        Self {
            kernel: gaussian_kernel(sigma, radius),
            radius,
        }
    }
}

/// Normalized kernel of length `2 * radius + 1`.
fn gaussian_kernel(sigma: f32, radius: usize) -> Vec<f32> {
    let sigma = sigma.max(1e-3);
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

impl GaussianFilter {
    /// Convolve one sample from a neighborhood lookup, skipping `NaN` taps.
    #[inline]
    fn tap<F: Fn(isize) -> f32>(&self, center: f32, sample: F) -> f32 {
        if center.is_nan() {
            return f32::NAN;
        }
        let mut acc = 0.0f32;
        let mut weight = 0.0f32;
        for (i, &k) in self.kernel.iter().enumerate() {
            let v = sample(i as isize - self.radius as isize);
            if v.is_nan() {
                continue;
            }
            acc += v * k;
            weight += k;
        }
        if weight > 0.0 {
            acc / weight
        } else {
            f32::NAN
        }
    }
}

impl ScanFilter for GaussianFilter {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn apply(&self, grid: &mut PolarGrid) {
        let n_rays = grid.n_rays();
        let n_bins = grid.n_bins();
        if n_rays == 0 || n_bins == 0 || self.radius == 0 {
            return;
        }

        // Azimuthal pass, wrapping.
        let snapshot = grid.clone();
        for ray in 0..n_rays {
            for bin in 0..n_bins {
                let value = self.tap(snapshot.get(ray, bin), |offset| {
                    let r = (ray as isize + offset).rem_euclid(n_rays as isize) as usize;
                    snapshot.get(r, bin)
                });
                grid.set(ray, bin, value);
            }
        }

        // Range pass, clamped.
        let snapshot = grid.clone();
        for ray in 0..n_rays {
            for bin in 0..n_bins {
                let value = self.tap(snapshot.get(ray, bin), |offset| {
                    let b = (bin as isize + offset).clamp(0, n_bins as isize - 1) as usize;
                    snapshot.get(ray, b)
                });
                grid.set(ray, bin, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_normalized() {
        let kernel = gaussian_kernel(1.5, 3);
        assert_eq!(kernel.len(), 7);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        // Symmetric, peaked at the center
        assert_eq!(kernel[0], kernel[6]);
        assert!(kernel[3] > kernel[2]);
    }

    #[test]
    fn test_constant_field_unchanged() {
        let mut grid = PolarGrid::filled(20.0, 8, 8);
        GaussianFilter::new(1.0, 2).apply(&mut grid);
        for &v in grid.samples() {
            assert!((v - 20.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_spike_spreads_and_mass_shrinks() {
        let mut grid = PolarGrid::filled(0.0, 9, 9);
        grid.set(4, 4, 100.0);

        GaussianFilter::new(1.0, 2).apply(&mut grid);

        assert!(grid.get(4, 4) < 100.0);
        assert!(grid.get(4, 5) > 0.0);
        assert!(grid.get(3, 4) > 0.0);
    }

    #[test]
    fn test_nan_gates_stay_nan() {
        let mut grid = PolarGrid::filled(10.0, 8, 8);
        grid.set(2, 2, f32::NAN);

        GaussianFilter::new(1.0, 2).apply(&mut grid);

        assert!(grid.get(2, 2).is_nan());
        // Neighbors renormalize over valid taps, so the constant holds.
        assert!((grid.get(2, 3) - 10.0).abs() < 1e-5);
    }
}
