//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// An empty box that any observed point will expand.
    pub fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    /// Expand the box to include a point.
    pub fn expand(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    /// Merge another box into this one.
    pub fn merge(&mut self, other: &BoundingBox) {
        self.min_lon = self.min_lon.min(other.min_lon);
        self.min_lat = self.min_lat.min(other.min_lat);
        self.max_lon = self.max_lon.max(other.max_lon);
        self.max_lat = self.max_lat.max(other.max_lat);
    }

    /// Width of the bounding box in degrees longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height of the bounding box in degrees latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Return a copy grown by `padding_deg` on every side.
    pub fn padded(&self, padding_deg: f64) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon - padding_deg,
            min_lat: self.min_lat - padding_deg,
            max_lon: self.max_lon + padding_deg,
            max_lat: self.max_lat + padding_deg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_from_empty() {
        let mut bbox = BoundingBox::empty();
        bbox.expand(-90.5, 40.0);
        bbox.expand(-89.5, 41.0);

        assert_eq!(bbox.min_lon, -90.5);
        assert_eq!(bbox.max_lon, -89.5);
        assert_eq!(bbox.min_lat, 40.0);
        assert_eq!(bbox.max_lat, 41.0);
    }

    #[test]
    fn test_contains_point() {
        let bbox = BoundingBox::new(-91.0, 39.0, -89.0, 41.0);
        assert!(bbox.contains_point(-90.0, 40.0));
        assert!(!bbox.contains_point(-88.0, 40.0));
        assert!(!bbox.contains_point(-90.0, 38.0));
    }

    #[test]
    fn test_padded() {
        let bbox = BoundingBox::new(-91.0, 39.0, -89.0, 41.0).padded(0.5);
        assert_eq!(bbox.min_lon, -91.5);
        assert_eq!(bbox.max_lat, 41.5);
    }
}
