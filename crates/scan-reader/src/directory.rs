//! Directory-backed scan store.
//!
//! Walks a data directory, groups scan files into volumes by the timestamp
//! encoded in their filenames, and decodes files on demand through a
//! pluggable [`ScanDecoder`]. The production decoder (ODIM HDF5) lives
//! outside this crate; a flat little-endian decoder is provided for
//! fixtures and round-trip tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use radar_common::{
    elevation_matches, Channel, PolarGrid, PolarScan, RadarError, RadarResult, SiteLocation,
};

use crate::store::{volume_timestamp, ScanStore};

/// Decodes one scan file into a [`PolarScan`].
pub trait ScanDecoder: Send + Sync {
    /// Filename extensions this decoder handles, lowercase without the dot.
    fn extensions(&self) -> &[&str];

    fn decode(&self, path: &Path) -> RadarResult<PolarScan>;
}

/// Scan store over a directory of scan files.
pub struct DirectoryStore {
    root: PathBuf,
    decoder: Arc<dyn ScanDecoder>,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, decoder: Arc<dyn ScanDecoder>) -> Self {
        Self {
            root: root.into(),
            decoder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory and group decodable files by volume timestamp.
    fn volumes(&self) -> BTreeMap<DateTime<Utc>, Vec<PathBuf>> {
        let mut volumes: BTreeMap<DateTime<Utc>, Vec<PathBuf>> = BTreeMap::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !self.handles(path) {
                continue;
            }
            match volume_timestamp(path) {
                Some(ts) => volumes.entry(ts).or_default().push(path.to_path_buf()),
                None => {
                    tracing::debug!(path = %path.display(), "ignoring file without volume timestamp")
                }
            }
        }
        volumes
    }

    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.decoder.extensions().iter().any(|k| *k == ext)
            })
            .unwrap_or(false)
    }

    fn decode(&self, path: &Path) -> Option<PolarScan> {
        match self.decoder.decode(path) {
            Ok(scan) => Some(scan),
            // Read failures are logged and treated as missing; a bad file
            // never aborts the caller's volume.
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "scan decode failed, skipping");
                None
            }
        }
    }
}

/// Elevation angle encoded in a scan filename (`<site>_<ts>_<elev>.<ext>`).
fn file_elevation(path: &Path) -> Option<f64> {
    let stem = path.file_stem()?.to_str()?;
    stem.split('_').nth(2)?.parse().ok()
}

#[async_trait]
impl ScanStore for DirectoryStore {
    async fn timestamps(&self) -> RadarResult<Vec<DateTime<Utc>>> {
        Ok(self.volumes().keys().copied().collect())
    }

    async fn elevations(&self, timestamp: DateTime<Utc>) -> RadarResult<Vec<f64>> {
        let volumes = self.volumes();
        let mut elevations: Vec<f64> = volumes
            .get(&timestamp)
            .map(|paths| paths.iter().filter_map(|p| file_elevation(p)).collect())
            .unwrap_or_default();
        elevations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Ok(elevations)
    }

    async fn scan(
        &self,
        timestamp: DateTime<Utc>,
        elevation_deg: f64,
    ) -> RadarResult<Option<Arc<PolarScan>>> {
        let volumes = self.volumes();
        let Some(paths) = volumes.get(&timestamp) else {
            return Ok(None);
        };

        // Nearest filename elevation within the tolerance band.
        let candidate = paths
            .iter()
            .filter_map(|p| file_elevation(p).map(|e| (p, e)))
            .filter(|(_, e)| elevation_matches(*e, elevation_deg))
            .min_by(|(_, a), (_, b)| {
                let da = (a - elevation_deg).abs();
                let db = (b - elevation_deg).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });

        Ok(candidate
            .and_then(|(path, _)| self.decode(path))
            .map(Arc::new))
    }
}

/// Flat little-endian scan file format for fixtures.
///
/// Layout: `RSCN` magic, unix timestamp (i64), site lat/lon/height,
/// elevation, range scale/start (f64 each), ray/bin/channel counts (u32),
/// azimuth table, then per channel a length-prefixed name and the row-major
/// f32 sample grid.
pub struct FlatBinaryDecoder;

const FLAT_MAGIC: &[u8; 4] = b"RSCN";

impl FlatBinaryDecoder {
    /// Serialize a scan into the flat fixture format.
    pub fn write(path: &Path, scan: &PolarScan) -> RadarResult<()> {
        let mut buf: Vec<u8> = Vec::new();
        buf.extend_from_slice(FLAT_MAGIC);
        buf.extend_from_slice(&scan.timestamp().timestamp().to_le_bytes());
        for v in [
            scan.site().latitude,
            scan.site().longitude,
            scan.site().height,
            scan.elevation_deg(),
            scan.range_scale(),
            scan.range_start(),
        ] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let channels = scan.channels();
        buf.extend_from_slice(&(scan.n_rays() as u32).to_le_bytes());
        buf.extend_from_slice(&(scan.n_bins() as u32).to_le_bytes());
        buf.extend_from_slice(&(channels.len() as u32).to_le_bytes());
        for az in scan.azimuths() {
            buf.extend_from_slice(&az.to_le_bytes());
        }
        for channel in channels {
            let name = channel.as_str().as_bytes();
            buf.push(name.len() as u8);
            buf.extend_from_slice(name);
            let grid = scan
                .channel(channel)
                .ok_or_else(|| RadarError::InternalError("channel listed but absent".into()))?;
            for sample in grid.samples() {
                buf.extend_from_slice(&sample.to_le_bytes());
            }
        }
        fs::write(path, buf)?;
        Ok(())
    }
}

/// Byte cursor over a fixture file.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> RadarResult<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(RadarError::MalformedScan("truncated scan file".into()));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u32(&mut self) -> RadarResult<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> RadarResult<i64> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn f64(&mut self) -> RadarResult<f64> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn f32(&mut self) -> RadarResult<f32> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }
}

impl ScanDecoder for FlatBinaryDecoder {
    fn extensions(&self) -> &[&str] {
        &["scan"]
    }

    fn decode(&self, path: &Path) -> RadarResult<PolarScan> {
        let data = fs::read(path)?;
        let mut cur = Cursor { data: &data, pos: 0 };

        if cur.take(4)? != FLAT_MAGIC {
            return Err(RadarError::MalformedScan("bad magic".into()));
        }
        let timestamp = DateTime::<Utc>::from_timestamp(cur.i64()?, 0)
            .ok_or_else(|| RadarError::MalformedScan("timestamp out of range".into()))?;
        let site = SiteLocation {
            latitude: cur.f64()?,
            longitude: cur.f64()?,
            height: cur.f64()?,
        };
        let elevation_deg = cur.f64()?;
        let range_scale = cur.f64()?;
        let range_start = cur.f64()?;
        let n_rays = cur.u32()? as usize;
        let n_bins = cur.u32()? as usize;
        let n_channels = cur.u32()? as usize;

        let mut azimuths = Vec::with_capacity(n_rays);
        for _ in 0..n_rays {
            azimuths.push(cur.f64()?);
        }

        let mut channels = std::collections::HashMap::new();
        for _ in 0..n_channels {
            let name_len = cur.take(1)?[0] as usize;
            let name = std::str::from_utf8(cur.take(name_len)?)
                .map_err(|_| RadarError::MalformedScan("bad channel name".into()))?;
            let channel: Channel = name
                .parse()
                .map_err(|_| RadarError::MalformedScan(format!("unknown channel '{}'", name)))?;
            let mut samples = Vec::with_capacity(n_rays * n_bins);
            for _ in 0..n_rays * n_bins {
                samples.push(cur.f32()?);
            }
            let grid = PolarGrid::new(samples, n_rays, n_bins).ok_or_else(|| {
                RadarError::MalformedScan("channel grid dimension mismatch".into())
            })?;
            channels.insert(channel, grid);
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
}
