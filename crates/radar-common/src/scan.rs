//! Polar scan: one radar elevation sweep.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::{Channel, GeodeticField, PolarGrid, RadarError, RadarResult};

/// Radar site location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Antenna height above sea level in meters.
    pub height: f64,
}

/// An immutable single-elevation radar sweep: `n_rays` azimuths by `n_bins`
/// range gates, with one sample grid per channel.
///
/// `NaN` samples mean "missing"; the [`crate::raster::NO_COVERAGE`] sentinel
/// marks gates known to be outside coverage.
#[derive(Debug)]
pub struct PolarScan {
    timestamp: DateTime<Utc>,
    site: SiteLocation,
    elevation_deg: f64,
    n_rays: usize,
    n_bins: usize,
    /// Meters per range bin.
    range_scale: f64,
    /// Range of the first bin's near edge, in meters.
    range_start: f64,
    /// Per-ray beam azimuth in degrees clockwise from north.
    azimuths: Vec<f64>,
    channels: HashMap<Channel, PolarGrid>,
    geodetic: OnceLock<Arc<GeodeticField>>,
}

impl PolarScan {
    /// Assemble a scan, validating the data-model invariants: every channel
    /// grid is `n_rays x n_bins` and the azimuth table has one entry per ray.
    ///
    /// Zero-dimension scans are valid (they carry no channels) so callers can
    /// treat "no usable data" as a normal outcome rather than an error.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        site: SiteLocation,
        elevation_deg: f64,
        n_rays: usize,
        n_bins: usize,
        range_scale: f64,
        range_start: f64,
        azimuths: Vec<f64>,
        channels: HashMap<Channel, PolarGrid>,
    ) -> RadarResult<Self> {
        if azimuths.len() != n_rays {
            return Err(RadarError::InvariantViolation(format!(
                "azimuth table has {} entries for {} rays",
                azimuths.len(),
                n_rays
            )));
        }
        for (channel, grid) in &channels {
            if grid.n_rays() != n_rays || grid.n_bins() != n_bins {
                return Err(RadarError::InvariantViolation(format!(
                    "channel {} grid is {}x{}, scan is {}x{}",
                    channel,
                    grid.n_rays(),
                    grid.n_bins(),
                    n_rays,
                    n_bins
                )));
            }
        }

        Ok(Self {
            timestamp,
            site,
            elevation_deg,
            n_rays,
            n_bins,
            range_scale,
            range_start,
            azimuths,
            channels,
            geodetic: OnceLock::new(),
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn site(&self) -> SiteLocation {
        self.site
    }

    pub fn elevation_deg(&self) -> f64 {
        self.elevation_deg
    }

    pub fn n_rays(&self) -> usize {
        self.n_rays
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn range_scale(&self) -> f64 {
        self.range_scale
    }

    pub fn range_start(&self) -> f64 {
        self.range_start
    }

    /// Beam azimuth of a ray in degrees clockwise from north.
    pub fn azimuth_deg(&self, ray: usize) -> f64 {
        self.azimuths[ray]
    }

    pub fn azimuths(&self) -> &[f64] {
        &self.azimuths
    }

    /// Whether the scan carries no usable samples at all.
    pub fn is_empty(&self) -> bool {
        self.n_rays == 0 || self.n_bins == 0 || self.channels.is_empty()
    }

    /// Channels present in this scan, in the canonical ordering.
    pub fn channels(&self) -> Vec<Channel> {
        Channel::all()
            .iter()
            .copied()
            .filter(|c| self.channels.contains_key(c))
            .collect()
    }

    pub fn channel(&self, channel: Channel) -> Option<&PolarGrid> {
        self.channels.get(&channel)
    }

    /// Per-scan cache slot for the geodetic projection. The projector fills
    /// this on first use; the field lives exactly as long as the scan.
    pub fn geodetic_cache(&self) -> &OnceLock<Arc<GeodeticField>> {
        &self.geodetic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteLocation {
        SiteLocation {
            latitude: 40.0,
            longitude: -90.0,
            height: 200.0,
        }
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut channels = HashMap::new();
        channels.insert(Channel::Reflectivity, PolarGrid::filled(0.0, 4, 5));

        let result = PolarScan::new(
            Utc::now(),
            site(),
            0.5,
            4,
            4, // grid says 5 bins
            500.0,
            0.0,
            vec![0.0, 90.0, 180.0, 270.0],
            channels,
        );
        assert!(matches!(result, Err(RadarError::InvariantViolation(_))));
    }

    #[test]
    fn test_azimuth_length_mismatch_rejected() {
        let result = PolarScan::new(
            Utc::now(),
            site(),
            0.5,
            4,
            4,
            500.0,
            0.0,
            vec![0.0, 90.0],
            HashMap::new(),
        );
        assert!(matches!(result, Err(RadarError::InvariantViolation(_))));
    }

    #[test]
    fn test_zero_dimension_scan_is_valid_and_empty() {
        let scan = PolarScan::new(
            Utc::now(),
            site(),
            0.5,
            0,
            0,
            500.0,
            0.0,
            vec![],
            HashMap::new(),
        )
        .unwrap();
        assert!(scan.is_empty());
        assert!(scan.channels().is_empty());
    }
}
