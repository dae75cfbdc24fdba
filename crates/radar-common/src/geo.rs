//! Spherical-earth constants and helpers shared by projection and
//! rasterization.

use std::f64::consts::PI;

/// Mean Earth radius in meters (WGS84 mean).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Effective Earth radius (4/3 model) correcting for standard atmospheric
/// refraction when relating beam range to height.
pub const EFFECTIVE_RADIUS_M: f64 = EARTH_RADIUS_M * 4.0 / 3.0;

/// Meters per degree of latitude on the sphere.
pub const METERS_PER_DEG_LAT: f64 = EARTH_RADIUS_M * PI / 180.0;

/// Normalize an angle in radians into the half-open interval `(-PI, PI]`.
///
/// Uses a true modulo rather than repeated subtraction so arbitrarily large
/// inputs (and accumulated sums near the antimeridian) land in range without
/// seam artifacts.
pub fn normalize_longitude(lon_rad: f64) -> f64 {
    let wrapped = (lon_rad + PI).rem_euclid(2.0 * PI);
    if wrapped == 0.0 {
        PI
    } else {
        wrapped - PI
    }
}

/// Great-circle distance in meters between two points given in degrees.
pub fn haversine_m(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let dlat = (lat2_deg - lat1_deg).to_radians();
    let dlon = (lon2_deg - lon1_deg).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}
