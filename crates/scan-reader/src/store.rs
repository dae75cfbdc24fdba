//! Scan stores: volume grouping and elevation queries.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::RwLock;

use radar_common::{elevation_matches, PolarScan, RadarResult};

/// Read access to scans grouped into volumes by timestamp.
///
/// "Not found" is modeled as `Ok(None)` / empty collections. Errors are
/// reserved for genuine failures of the backing source.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Volume timestamps known to the store, ascending.
    async fn timestamps(&self) -> RadarResult<Vec<DateTime<Utc>>>;

    /// Elevation angles available for a volume, ascending. Empty when the
    /// timestamp is unknown.
    async fn elevations(&self, timestamp: DateTime<Utc>) -> RadarResult<Vec<f64>>;

    /// Fetch the scan for a timestamp and elevation. Matching uses the
    /// tolerance band from [`radar_common::elevation_matches`], nearest
    /// match wins.
    async fn scan(
        &self,
        timestamp: DateTime<Utc>,
        elevation_deg: f64,
    ) -> RadarResult<Option<Arc<PolarScan>>>;
}

/// Resolve the volume timestamp encoded in a scan filename.
///
/// Filenames follow `<site>_<YYYYMMDDHHMMSS>_<elevation>.<ext>`; every file
/// of one volume shares the timestamp component. Returns `None` for paths
/// that do not follow the scheme.
pub fn volume_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let stem = path.file_stem()?.to_str()?;
    let ts_part = stem.split('_').nth(1)?;
    NaiveDateTime::parse_from_str(ts_part, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// In-process store of prebuilt scans.
///
/// Used by the test suite and by embedders that decode scans themselves.
#[derive(Default)]
pub struct MemoryStore {
    volumes: RwLock<BTreeMap<DateTime<Utc>, Vec<Arc<PolarScan>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scan to its volume, keeping the volume sorted by elevation.
    pub async fn insert(&self, scan: PolarScan) {
        let mut volumes = self.volumes.write().await;
        let volume = volumes.entry(scan.timestamp()).or_default();
        volume.push(Arc::new(scan));
        volume.sort_by(|a, b| {
            a.elevation_deg()
                .partial_cmp(&b.elevation_deg())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn timestamps(&self) -> RadarResult<Vec<DateTime<Utc>>> {
        Ok(self.volumes.read().await.keys().copied().collect())
    }

    async fn elevations(&self, timestamp: DateTime<Utc>) -> RadarResult<Vec<f64>> {
        Ok(self
            .volumes
            .read()
            .await
            .get(&timestamp)
            .map(|scans| scans.iter().map(|s| s.elevation_deg()).collect())
            .unwrap_or_default())
    }

    async fn scan(
        &self,
        timestamp: DateTime<Utc>,
        elevation_deg: f64,
    ) -> RadarResult<Option<Arc<PolarScan>>> {
        let volumes = self.volumes.read().await;
        Ok(nearest_match(
            volumes.get(&timestamp).map_or(&[][..], |v| v),
            elevation_deg,
        ))
    }
}

/// Nearest scan within the elevation tolerance band.
pub(crate) fn nearest_match(scans: &[Arc<PolarScan>], elevation_deg: f64) -> Option<Arc<PolarScan>> {
    scans
        .iter()
        .filter(|s| elevation_matches(s.elevation_deg(), elevation_deg))
        .min_by(|a, b| {
            let da = (a.elevation_deg() - elevation_deg).abs();
            let db = (b.elevation_deg() - elevation_deg).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use test_utils::generators::{scan_with_constant, test_timestamp};

    #[test]
    fn test_volume_timestamp_parses_scheme() {
        let path = PathBuf::from("/data/KAAA_20240615120000_0.5.h5");
        assert_eq!(
            volume_timestamp(&path),
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_volume_timestamp_rejects_other_names() {
        assert_eq!(volume_timestamp(Path::new("/data/readme.txt")), None);
        assert_eq!(volume_timestamp(Path::new("/data/KAAA_banana_0.5.h5")), None);
    }

    #[tokio::test]
    async fn test_memory_store_elevations_ascending() {
        let store = MemoryStore::new();
        for elevation in [2.4, 0.5, 1.5] {
            store
                .insert(scan_with_constant(4, 4, 40.0, -90.0, elevation, 10.0))
                .await;
        }
        let elevations = store.elevations(test_timestamp()).await.unwrap();
        assert_eq!(elevations, vec![0.5, 1.5, 2.4]);
    }

    #[tokio::test]
    async fn test_scan_matches_within_tolerance() {
        let store = MemoryStore::new();
        store
            .insert(scan_with_constant(4, 4, 40.0, -90.0, 0.48, 10.0))
            .await;

        let hit = store.scan(test_timestamp(), 0.5).await.unwrap();
        assert_eq!(hit.unwrap().elevation_deg(), 0.48);

        let miss = store.scan(test_timestamp(), 1.5).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_scan_prefers_nearest() {
        let store = MemoryStore::new();
        store
            .insert(scan_with_constant(4, 4, 40.0, -90.0, 0.4, 10.0))
            .await;
        store
            .insert(scan_with_constant(4, 4, 40.0, -90.0, 0.6, 20.0))
            .await;

        let hit = store.scan(test_timestamp(), 0.58).await.unwrap().unwrap();
        assert_eq!(hit.elevation_deg(), 0.6);
    }

    #[tokio::test]
    async fn test_unknown_timestamp_is_absent_not_error() {
        let store = MemoryStore::new();
        let ts = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        assert!(store.elevations(ts).await.unwrap().is_empty());
        assert!(store.scan(ts, 0.5).await.unwrap().is_none());
    }
}
