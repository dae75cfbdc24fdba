//! Cache key scheme.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use radar_common::Channel;

/// Cache key for one rendered image: (timestamp, elevation, channel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageKey {
    pub timestamp: DateTime<Utc>,
    pub elevation_deg: f64,
    pub channel: Channel,
}

impl ImageKey {
    pub fn new(timestamp: DateTime<Utc>, elevation_deg: f64, channel: Channel) -> Self {
        Self {
            timestamp,
            elevation_deg,
            channel,
        }
    }

    /// Key prefix shared by every image of one volume, used for cascading
    /// deletes (the distributed backend has no secondary index, so removal
    /// is a pattern scan over this prefix).
    pub fn volume_prefix(timestamp: DateTime<Utc>) -> String {
        format!(
            "radar:img:{}:",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Key for a volume's processed metadata.
    pub fn volume_key(timestamp: DateTime<Utc>) -> String {
        format!(
            "radar:vol:{}",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Elevation quantized to one decimal: the tolerance band for
        // matching tilts is far coarser than 0.1 degrees.
        write!(
            f,
            "{}{:.1}:{}",
            Self::volume_prefix(self.timestamp),
            self.elevation_deg,
            self.channel
        )
    }
}
