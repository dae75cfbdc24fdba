//! Volume-level metadata and elevation matching policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tolerance band for matching elevation angles across files.
///
/// Floating-point elevations for "the same" tilt differ slightly between
/// files, so matching is a policy band rather than exact equality.
pub const ELEVATION_TOLERANCE_DEG: f64 = 0.5;

/// Whether two elevation angles refer to the same tilt.
pub fn elevation_matches(a_deg: f64, b_deg: f64) -> bool {
    (a_deg - b_deg).abs() <= ELEVATION_TOLERANCE_DEG
}

/// Metadata recorded after a volume has been fully processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedVolume {
    /// Nominal timestamp shared by all scans of the volume.
    pub timestamp: DateTime<Utc>,
    /// Elevation angles that produced imagery, ascending.
    pub elevations: Vec<f64>,
    /// When processing finished.
    pub processed_at: DateTime<Utc>,
}
