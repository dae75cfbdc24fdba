//! Beam geometry and the spherical forward geodesic.

use rayon::prelude::*;
use std::sync::Arc;

use radar_common::geo::{normalize_longitude, EARTH_RADIUS_M, EFFECTIVE_RADIUS_M};
use radar_common::scan::PolarScan;
use radar_common::{BoundingBox, GeodeticField};

/// Projects polar scans to geographic coordinates.
///
/// Stateless; the result is cached on the scan itself so repeated calls for
/// the same scan return the identical field without recomputation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodeticProjector;

/// Per-ray output of the parallel phase: one row of coordinates plus the
/// ray's own lat/lon extent. The bbox reduction happens in the sequential
/// fold, so the parallel region touches no shared state.
struct RayRow {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    height: Vec<f64>,
    bbox: BoundingBox,
}

impl GeodeticProjector {
    pub fn new() -> Self {
        Self
    }

    /// Project a scan to a [`GeodeticField`], computing it on first use and
    /// returning the cached field thereafter.
    pub fn project(&self, scan: &PolarScan) -> Arc<GeodeticField> {
        scan.geodetic_cache()
            .get_or_init(|| Arc::new(self.compute(scan)))
            .clone()
    }

    fn compute(&self, scan: &PolarScan) -> GeodeticField {
        let n_rays = scan.n_rays();
        let n_bins = scan.n_bins();
        let slant = slant_ranges(scan);
        let elevation = scan.elevation_deg().to_radians();
        let site = scan.site();
        let lat0 = site.latitude.to_radians();
        let lon0 = site.longitude.to_radians();

        // Independent per-ray work units; min/max stays ray-local here and
        // is merged in the fold below.
        let rows: Vec<RayRow> = (0..n_rays)
            .into_par_iter()
            .map(|ray| {
                let azimuth = scan.azimuth_deg(ray).to_radians();
                project_ray(&slant, elevation, azimuth, lat0, lon0, site.height)
            })
            .collect();

        let mut latitude = Vec::with_capacity(n_rays * n_bins);
        let mut longitude = Vec::with_capacity(n_rays * n_bins);
        let mut height = Vec::with_capacity(n_rays * n_bins);
        let mut bbox = BoundingBox::empty();

        for row in rows {
            latitude.extend_from_slice(&row.latitude);
            longitude.extend_from_slice(&row.longitude);
            height.extend_from_slice(&row.height);
            bbox.merge(&row.bbox);
        }

        GeodeticField::new(latitude, longitude, height, n_rays, n_bins, bbox)
    }
}

/// Project one ray's bins along a fixed azimuth.
fn project_ray(
    slant: &[f64],
    elevation: f64,
    azimuth: f64,
    lat0: f64,
    lon0: f64,
    site_height_m: f64,
) -> RayRow {
    let n_bins = slant.len();
    let mut latitude = Vec::with_capacity(n_bins);
    let mut longitude = Vec::with_capacity(n_bins);
    let mut height = Vec::with_capacity(n_bins);
    let mut bbox = BoundingBox::empty();

    let sin_el = elevation.sin();
    let cos_el = elevation.cos();
    let sin_lat0 = lat0.sin();
    let cos_lat0 = lat0.cos();
    let sin_az = azimuth.sin();
    let cos_az = azimuth.cos();

    for &r in slant {
        // Beam height above the antenna via the effective-radius model.
        let re = EFFECTIVE_RADIUS_M;
        let h = (r * r + re * re + 2.0 * r * re * sin_el).sqrt() - re;

        // Surface arc length along the great circle under the beam.
        let s = re * (r * cos_el / (re + h)).asin();

        // Forward geodesic on the sphere.
        let sigma = s / EARTH_RADIUS_M;
        let sin_sigma = sigma.sin();
        let cos_sigma = sigma.cos();

        let sin_lat = sin_lat0 * cos_sigma + cos_lat0 * sin_sigma * cos_az;
        let lat = sin_lat.asin();
        let lon = normalize_longitude(
            lon0 + (sin_az * sin_sigma * cos_lat0).atan2(cos_sigma - sin_lat0 * sin_lat),
        );

        let lat_deg = lat.to_degrees();
        let lon_deg = lon.to_degrees();
        bbox.expand(lon_deg, lat_deg);

        latitude.push(lat_deg);
        longitude.push(lon_deg);
        height.push(site_height_m + h);
    }

    RayRow {
        latitude,
        longitude,
        height,
        bbox,
    }
}

/// Slant range to each bin center, in meters along the beam.
fn slant_ranges(scan: &PolarScan) -> Vec<f64> {
    let scale = scan.range_scale();
    let start = scan.range_start();
    (0..scan.n_bins())
        .map(|j| start + j as f64 * scale + scale / 2.0)
        .collect()
}

/// Ground-projected range to each bin center, in meters from the site.
///
/// Length equals `n_bins` and values are monotonically non-decreasing.
pub fn ground_ranges(scan: &PolarScan) -> Vec<f64> {
    let cos_el = scan.elevation_deg().to_radians().cos();
    slant_ranges(scan).into_iter().map(|r| r * cos_el).collect()
}

/// Ground range of the far edge of the last bin, in meters.
pub fn max_ground_range(scan: &PolarScan) -> f64 {
    let cos_el = scan.elevation_deg().to_radians().cos();
    (scan.range_start() + scan.n_bins() as f64 * scan.range_scale()) * cos_el
}
