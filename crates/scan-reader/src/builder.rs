//! Scan assembly from decoded attributes and channel grids.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use radar_common::{Channel, PolarGrid, PolarScan, RadarError, RadarResult, SiteLocation};

use crate::attrs::Attributes;

/// Attribute names this builder reads, following the ODIM vocabulary the
/// production decoder emits.
pub mod field {
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "lon";
    pub const HEIGHT: &str = "height";
    pub const ELEVATION: &str = "elangle";
    pub const N_RAYS: &str = "nrays";
    pub const N_BINS: &str = "nbins";
    pub const RANGE_SCALE: &str = "rscale";
    pub const RANGE_START: &str = "rstart";
    pub const AZIMUTHS: &str = "azimuths";
}

/// Build a [`PolarScan`] from a decoded attribute map and per-channel grids.
///
/// Attribute failures surface as [`RadarError::MissingAttribute`] or
/// [`RadarError::TypeMismatch`]; dimension mismatches between the declared
/// scan shape and a channel grid are an invariant violation. A scan that
/// declares zero rays or bins builds successfully and reports
/// [`PolarScan::is_empty`], so callers can skip it as "no usable data".
pub fn build_scan(
    attrs: &Attributes,
    channels: HashMap<Channel, PolarGrid>,
) -> RadarResult<PolarScan> {
    let timestamp = parse_timestamp(attrs.text(field::DATE)?, attrs.text(field::TIME)?)?;
    let site = SiteLocation {
        latitude: attrs.double(field::LATITUDE)?,
        longitude: attrs.double(field::LONGITUDE)?,
        height: attrs.double(field::HEIGHT)?,
    };
    let elevation_deg = attrs.double(field::ELEVATION)?;
    let n_rays = attrs.dimension(field::N_RAYS)?;
    let n_bins = attrs.dimension(field::N_BINS)?;
    let range_scale = attrs.double(field::RANGE_SCALE)?;
    let range_start = attrs.double(field::RANGE_START)?;
    let azimuths = attrs.double_array(field::AZIMUTHS)?.to_vec();

    if range_scale <= 0.0 && n_bins > 0 {
        return Err(RadarError::MalformedScan(format!(
            "non-positive range scale {}",
            range_scale
        )));
    }

    PolarScan::new(
        timestamp,
        site,
        elevation_deg,
        n_rays,
        n_bins,
        range_scale,
        range_start,
        azimuths,
        channels,
    )
}

/// Parse ODIM "YYYYMMDD" + "HHMMSS" attribute pair into UTC.
fn parse_timestamp(date: &str, time: &str) -> RadarResult<DateTime<Utc>> {
    let combined = format!("{}{}", date, time);
    NaiveDateTime::parse_from_str(&combined, "%Y%m%d%H%M%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| RadarError::MalformedScan(format!("bad date/time '{} {}': {}", date, time, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::AttrValue;
    use chrono::TimeZone;

    fn base_attrs(n_rays: i64, n_bins: i64) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(field::DATE, AttrValue::Text("20240615".into()));
        attrs.insert(field::TIME, AttrValue::Text("120000".into()));
        attrs.insert(field::LATITUDE, AttrValue::Double(40.0));
        attrs.insert(field::LONGITUDE, AttrValue::Double(-90.0));
        attrs.insert(field::HEIGHT, AttrValue::Double(200.0));
        attrs.insert(field::ELEVATION, AttrValue::Double(0.5));
        attrs.insert(field::N_RAYS, AttrValue::Long(n_rays));
        attrs.insert(field::N_BINS, AttrValue::Long(n_bins));
        attrs.insert(field::RANGE_SCALE, AttrValue::Double(500.0));
        attrs.insert(field::RANGE_START, AttrValue::Double(0.0));
        let azimuths: Vec<f64> = (0..n_rays).map(|i| i as f64 * 360.0 / n_rays.max(1) as f64).collect();
        attrs.insert(field::AZIMUTHS, AttrValue::DoubleArray(azimuths));
        attrs
    }

    #[test]
    fn test_build_scan_complete() {
        let attrs = base_attrs(4, 8);
        let mut channels = HashMap::new();
        channels.insert(Channel::Reflectivity, PolarGrid::filled(10.0, 4, 8));

        let scan = build_scan(&attrs, channels).unwrap();
        assert_eq!(
            scan.timestamp(),
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(scan.n_rays(), 4);
        assert_eq!(scan.n_bins(), 8);
        assert_eq!(scan.site().latitude, 40.0);
        assert_eq!(scan.channels(), vec![Channel::Reflectivity]);
    }

    #[test]
    fn test_zero_dimension_builds_empty() {
        let mut attrs = base_attrs(0, 0);
        attrs.insert(field::AZIMUTHS, AttrValue::DoubleArray(vec![]));
        let scan = build_scan(&attrs, HashMap::new()).unwrap();
        assert!(scan.is_empty());
    }

    #[test]
    fn test_missing_attribute_fails_by_name() {
        // Same as base_attrs but without the elevation angle.
        let full = base_attrs(4, 8);
        let mut attrs = Attributes::new();
        attrs.insert(field::DATE, AttrValue::Text(full.text(field::DATE).unwrap().into()));
        attrs.insert(field::TIME, AttrValue::Text(full.text(field::TIME).unwrap().into()));
        attrs.insert(field::LATITUDE, AttrValue::Double(40.0));
        attrs.insert(field::LONGITUDE, AttrValue::Double(-90.0));
        attrs.insert(field::HEIGHT, AttrValue::Double(200.0));
        attrs.insert(field::N_RAYS, AttrValue::Long(4));
        attrs.insert(field::N_BINS, AttrValue::Long(8));
        attrs.insert(field::RANGE_SCALE, AttrValue::Double(500.0));
        attrs.insert(field::RANGE_START, AttrValue::Double(0.0));
        attrs.insert(
            field::AZIMUTHS,
            AttrValue::DoubleArray(full.double_array(field::AZIMUTHS).unwrap().to_vec()),
        );

        match build_scan(&attrs, HashMap::new()) {
            Err(RadarError::MissingAttribute(name)) => assert_eq!(name, field::ELEVATION),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_grid_dimension_mismatch_rejected() {
        let attrs = base_attrs(4, 8);
        let mut channels = HashMap::new();
        channels.insert(Channel::Reflectivity, PolarGrid::filled(10.0, 4, 7));
        assert!(matches!(
            build_scan(&attrs, channels),
            Err(RadarError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let mut attrs = base_attrs(4, 8);
        attrs.insert(field::DATE, AttrValue::Text("2024-06-15".into()));
        assert!(matches!(
            build_scan(&attrs, HashMap::new()),
            Err(RadarError::MalformedScan(_))
        ));
    }
}
