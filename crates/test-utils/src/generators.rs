//! Synthetic scan and grid generators.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

use radar_common::scan::{PolarScan, SiteLocation};
use radar_common::{Channel, PolarGrid};

/// Range bin size used by all synthetic scans, in meters.
pub const TEST_RANGE_SCALE_M: f64 = 500.0;

/// Antenna height used by all synthetic scans, in meters.
pub const TEST_SITE_HEIGHT_M: f64 = 100.0;

/// Fixed nominal timestamp shared by synthetic volumes.
pub fn test_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Evenly spaced azimuths with ray 0 pointing due north.
pub fn even_azimuths(n_rays: usize) -> Vec<f64> {
    (0..n_rays)
        .map(|i| 360.0 * i as f64 / n_rays as f64)
        .collect()
}

/// A scan whose reflectivity channel is filled with a constant value.
///
/// Rays are evenly spaced starting due north, bins are 500 m, range starts
/// at zero.
pub fn scan_with_constant(
    n_rays: usize,
    n_bins: usize,
    site_lat: f64,
    site_lon: f64,
    elevation_deg: f64,
    value: f32,
) -> PolarScan {
    scan_with_channel(
        n_rays,
        n_bins,
        site_lat,
        site_lon,
        elevation_deg,
        Channel::Reflectivity,
        PolarGrid::filled(value, n_rays, n_bins),
    )
}

/// A scan carrying a single prebuilt channel grid.
pub fn scan_with_channel(
    n_rays: usize,
    n_bins: usize,
    site_lat: f64,
    site_lon: f64,
    elevation_deg: f64,
    channel: Channel,
    grid: PolarGrid,
) -> PolarScan {
    let mut channels = HashMap::new();
    channels.insert(channel, grid);

    PolarScan::new(
        test_timestamp(),
        SiteLocation {
            latitude: site_lat,
            longitude: site_lon,
            height: TEST_SITE_HEIGHT_M,
        },
        elevation_deg,
        n_rays,
        n_bins,
        TEST_RANGE_SCALE_M,
        0.0,
        even_azimuths(n_rays),
        channels,
    )
    .expect("synthetic scan invariants hold")
}

/// A zero-dimension scan, as surfaced for files with no usable data.
pub fn empty_scan(site_lat: f64, site_lon: f64) -> PolarScan {
    PolarScan::new(
        test_timestamp(),
        SiteLocation {
            latitude: site_lat,
            longitude: site_lon,
            height: TEST_SITE_HEIGHT_M,
        },
        0.5,
        0,
        0,
        TEST_RANGE_SCALE_M,
        0.0,
        vec![],
        HashMap::new(),
    )
    .expect("zero-dimension scan is valid")
}

/// An all-NaN grid with one rectangular block of cells set to `value`.
///
/// Handy for speckle-removal tests: the block is a single 4-connected
/// component of `rays.len() * bins.len()` cells.
pub fn grid_with_block(
    n_rays: usize,
    n_bins: usize,
    rays: std::ops::Range<usize>,
    bins: std::ops::Range<usize>,
    value: f32,
) -> PolarGrid {
    let mut grid = PolarGrid::filled(f32::NAN, n_rays, n_bins);
    for ray in rays {
        for bin in bins.clone() {
            grid.set(ray, bin, value);
        }
    }
    grid
}

/// A grid whose cell values encode their position as `ray * 1000 + bin`,
/// making data movement through filters easy to verify.
pub fn indexed_grid(n_rays: usize, n_bins: usize) -> PolarGrid {
    let mut grid = PolarGrid::filled(0.0, n_rays, n_bins);
    for ray in 0..n_rays {
        for bin in 0..n_bins {
            grid.set(ray, bin, (ray * 1000 + bin) as f32);
        }
    }
    grid
}
