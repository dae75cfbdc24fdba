//! The IDW splatting kernel and per-pixel classification.

use rayon::prelude::*;

use radar_common::geo::{haversine_m, METERS_PER_DEG_LAT};
use radar_common::raster::NO_COVERAGE;
use radar_common::scan::PolarScan;
use radar_common::{GeodeticField, GridSpec, PolarGrid, Raster};

/// Softening term keeping the weight finite when a sample lands exactly on
/// a pixel center.
const WEIGHT_EPSILON: f64 = 1e-6;

/// Headroom over the nominal maximum ground range before a pixel counts as
/// out of coverage.
const RANGE_MARGIN: f64 = 1.05;

/// Tuning parameters for rasterization.
#[derive(Debug, Clone, Copy)]
pub struct RasterizeParams {
    /// Neighbors farther than this many pixels from a sample get no weight.
    pub max_distance_px: f64,
    /// Pixels with accumulated weight below this are "no data".
    pub min_weight: f64,
    /// Pixels with fewer contributing samples than this are "no data".
    pub min_valid_count: u32,
    /// Maximum ground range of the scan, in meters.
    pub max_ground_range_m: f64,
}

impl RasterizeParams {
    pub fn new(max_ground_range_m: f64) -> Self {
        Self {
            max_distance_px: 2.0,
            min_weight: 1e-3,
            min_valid_count: 1,
            max_ground_range_m,
        }
    }
}

/// Thread-local accumulation buffers for one worker's share of the rays.
///
/// Merged sequentially in ray order once the parallel phase is done, so no
/// shared array is written concurrently and the result is deterministic.
struct Accumulator {
    weighted_sum: Vec<f64>,
    weight: Vec<f64>,
    count: Vec<u32>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
}

impl Accumulator {
    fn new(len: usize) -> Self {
        Self {
            weighted_sum: vec![0.0; len],
            weight: vec![0.0; len],
            count: vec![0; len],
            latitude: vec![f64::NAN; len],
            longitude: vec![f64::NAN; len],
        }
    }

    fn merge(&mut self, other: Accumulator) {
        for i in 0..self.weighted_sum.len() {
            self.weighted_sum[i] += other.weighted_sum[i];
            self.weight[i] += other.weight[i];
            self.count[i] += other.count[i];
            // First writer in ray order keeps the pixel's center coordinate.
            if self.latitude[i].is_nan() && !other.latitude[i].is_nan() {
                self.latitude[i] = other.latitude[i];
                self.longitude[i] = other.longitude[i];
            }
        }
    }

    fn splat(&mut self, spec: &GridSpec, params: &RasterizeParams, lon: f64, lat: f64, value: f32) {
        let (px, py) = spec.to_pixel(lon, lat);
        let cx = px.round() as isize;
        let cy = py.round() as isize;

        for ny in cy - 1..=cy + 1 {
            if ny < 0 || ny >= spec.height as isize {
                continue;
            }
            for nx in cx - 1..=cx + 1 {
                if nx < 0 || nx >= spec.width as isize {
                    continue;
                }
                let d = (px - nx as f64).hypot(py - ny as f64);
                if d > params.max_distance_px {
                    continue;
                }
                let w = 1.0 / (d.powf(1.5) + WEIGHT_EPSILON);
                let idx = ny as usize * spec.width + nx as usize;
                self.weighted_sum[idx] += value as f64 * w;
                self.weight[idx] += w;
                self.count[idx] += 1;
                if self.latitude[idx].is_nan() {
                    self.latitude[idx] = lat;
                    self.longitude[idx] = lon;
                }
            }
        }
    }
}

/// IDW rasterizer for one scan geometry.
pub struct IdwRasterizer {
    params: RasterizeParams,
}

impl IdwRasterizer {
    pub fn new(params: RasterizeParams) -> Self {
        Self { params }
    }

    /// Rasterize a channel grid onto `spec`.
    ///
    /// `valid` decides which samples contribute; pass `|v| !v.is_nan()` for
    /// the default behavior.
    pub fn rasterize<F>(
        &self,
        scan: &PolarScan,
        channel: &PolarGrid,
        field: &GeodeticField,
        spec: &GridSpec,
        valid: F,
    ) -> Raster
    where
        F: Fn(f32) -> bool + Sync,
    {
        let n_rays = scan.n_rays();
        let n_bins = scan.n_bins();
        let pixels = spec.len();
        let site = scan.site();

        // Ground-projected bin-center ranges, shared by every ray.
        let cos_el = scan.elevation_deg().to_radians().cos();
        let ground: Vec<f64> = (0..n_bins)
            .map(|j| (scan.range_start() + j as f64 * scan.range_scale() + scan.range_scale() / 2.0) * cos_el)
            .collect();

        // Fast local linearization: degrees per meter at the site latitude.
        // Placement deliberately trades the exact geodesic for speed; the
        // coverage bbox below still comes from the exact projection.
        let deg_per_m_lat = 1.0 / METERS_PER_DEG_LAT;
        let deg_per_m_lon = 1.0 / (METERS_PER_DEG_LAT * site.latitude.to_radians().cos());

        let chunk = (n_rays / rayon::current_num_threads()).max(1);
        let rays: Vec<usize> = (0..n_rays).collect();

        let partials: Vec<Accumulator> = rays
            .par_chunks(chunk)
            .map(|ray_chunk| {
                let mut acc = Accumulator::new(pixels);
                for &ray in ray_chunk {
                    let az = scan.azimuth_deg(ray).to_radians();
                    let sin_az = az.sin();
                    let cos_az = az.cos();
                    for bin in 0..n_bins {
                        let value = channel.get(ray, bin);
                        if !valid(value) {
                            continue;
                        }
                        let east = ground[bin] * sin_az;
                        let north = ground[bin] * cos_az;
                        let lat = site.latitude + north * deg_per_m_lat;
                        let lon = site.longitude + east * deg_per_m_lon;
                        acc.splat(spec, &self.params, lon, lat, value);
                    }
                }
                acc
            })
            .collect();

        let mut acc = Accumulator::new(pixels);
        for partial in partials {
            acc.merge(partial);
        }

        self.classify(spec, field, site.latitude, site.longitude, acc)
    }

    /// Resolve each pixel's three-way classification.
    fn classify(
        &self,
        spec: &GridSpec,
        field: &GeodeticField,
        site_lat: f64,
        site_lon: f64,
        acc: Accumulator,
    ) -> Raster {
        let max_range = self.params.max_ground_range_m * RANGE_MARGIN;
        let mut values = vec![f32::NAN; spec.len()];
        let mut latitude = vec![0.0f64; spec.len()];
        let mut longitude = vec![0.0f64; spec.len()];

        for y in 0..spec.height {
            for x in 0..spec.width {
                let idx = y * spec.width + x;

                // Prefer the first accumulated center coordinate, fall back
                // to the grid cell center.
                let (lon, lat) = if acc.latitude[idx].is_nan() {
                    spec.pixel_center(x, y)
                } else {
                    (acc.longitude[idx], acc.latitude[idx])
                };
                latitude[idx] = lat;
                longitude[idx] = lon;

                let outside_bbox = !field.bbox().contains_point(lon, lat);
                if outside_bbox || haversine_m(site_lat, site_lon, lat, lon) > max_range {
                    values[idx] = NO_COVERAGE;
                    continue;
                }

                if acc.weight[idx] < self.params.min_weight
                    || acc.count[idx] < self.params.min_valid_count
                {
                    // Inside coverage, nothing usable: stays NaN.
                    continue;
                }

                values[idx] = (acc.weighted_sum[idx] / acc.weight[idx]) as f32;
            }
        }

        Raster {
            spec: *spec,
            values,
            latitude,
            longitude,
        }
    }
}

/// Rasterize with explicit parameters and validity predicate.
pub fn rasterize_with<F>(
    scan: &PolarScan,
    channel: &PolarGrid,
    field: &GeodeticField,
    spec: &GridSpec,
    params: RasterizeParams,
    valid: F,
) -> Raster
where
    F: Fn(f32) -> bool + Sync,
{
    IdwRasterizer::new(params).rasterize(scan, channel, field, spec, valid)
}

/// Rasterize with the default validity predicate (any non-`NaN` sample).
pub fn rasterize(
    scan: &PolarScan,
    channel: &PolarGrid,
    field: &GeodeticField,
    spec: &GridSpec,
    params: RasterizeParams,
) -> Raster {
    rasterize_with(scan, channel, field, spec, params, |v| !v.is_nan())
}
