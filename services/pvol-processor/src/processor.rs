//! Volume processing pipeline.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use projection::GeodeticProjector;
use radar_common::{GridSpec, PolarScan, ProcessedVolume, RadarError, RadarResult};
use rasterizer::{rasterize, RasterizeParams};
use renderer::encode_raster;
use scan_reader::ScanStore;
use storage::{ImageKey, RadarCache};

use crate::config::ProcessorConfig;
use crate::notify::{Notifier, RadarEvent};

/// Result of a processing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The volume was processed; `images` counts freshly rendered images.
    Completed { images: usize },
    /// Another request for the same timestamp is already in flight.
    Skipped,
}

/// Processes one volume at a time: for each elevation (ascending) and each
/// configured channel, project, filter, rasterize, encode and cache.
///
/// Duplicate requests for a timestamp already in flight coalesce into a
/// `Skipped` return without blocking. A single-slot semaphore serializes
/// the heavy pipeline across distinct timestamps.
pub struct PvolProcessor {
    store: Arc<dyn ScanStore>,
    cache: Arc<dyn RadarCache>,
    notifier: Arc<dyn Notifier>,
    config: ProcessorConfig,
    projector: GeodeticProjector,
    processing: Mutex<HashSet<DateTime<Utc>>>,
    pipeline_slot: Semaphore,
    shutdown: AtomicBool,
}

impl PvolProcessor {
    pub fn new(
        store: Arc<dyn ScanStore>,
        cache: Arc<dyn RadarCache>,
        notifier: Arc<dyn Notifier>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            store,
            cache,
            notifier,
            config,
            projector: GeodeticProjector::new(),
            processing: Mutex::new(HashSet::new()),
            pipeline_slot: Semaphore::new(1),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Request shutdown. The current elevation/channel finishes; the rest
    /// of the volume is abandoned.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Process one volume. Idempotent per timestamp: a request that arrives
    /// while the same timestamp is being processed returns
    /// [`ProcessOutcome::Skipped`] immediately.
    pub async fn request_pvol(&self, timestamp: DateTime<Utc>) -> RadarResult<ProcessOutcome> {
        {
            let mut processing = self.processing.lock().await;
            if !processing.insert(timestamp) {
                debug!(%timestamp, "already processing, skipping");
                return Ok(ProcessOutcome::Skipped);
            }
        }

        let result = self.run_volume(timestamp).await;
        self.processing.lock().await.remove(&timestamp);
        result.map(|images| ProcessOutcome::Completed { images })
    }

    /// Drop cached products for a timestamp and process it again.
    pub async fn reprocess(&self, timestamp: DateTime<Utc>) -> RadarResult<ProcessOutcome> {
        self.cache.remove_volume(timestamp).await?;
        self.request_pvol(timestamp).await
    }

    /// Startup sweep over every volume the store knows.
    pub async fn process_all(&self) -> RadarResult<usize> {
        let mut images = 0;
        for timestamp in self.store.timestamps().await? {
            if self.is_shutdown() {
                break;
            }
            if let ProcessOutcome::Completed { images: n } = self.request_pvol(timestamp).await? {
                images += n;
            }
        }
        Ok(images)
    }

    async fn run_volume(&self, timestamp: DateTime<Utc>) -> RadarResult<usize> {
        let _slot = self
            .pipeline_slot
            .acquire()
            .await
            .map_err(|e| RadarError::InternalError(format!("pipeline slot closed: {}", e)))?;

        let elevations = self.store.elevations(timestamp).await?;
        if elevations.is_empty() {
            info!(%timestamp, "no scans for volume");
            return Ok(0);
        }

        info!(%timestamp, n_elevations = elevations.len(), "processing volume");
        let mut produced: Vec<f64> = Vec::new();
        let mut images = 0;

        for elevation in elevations {
            if self.is_shutdown() {
                warn!(%timestamp, "shutdown requested, abandoning volume");
                return Ok(images);
            }

            let scan = match self.store.scan(timestamp, elevation).await {
                Ok(Some(scan)) => scan,
                Ok(None) => {
                    debug!(%timestamp, elevation, "no scan for elevation");
                    continue;
                }
                // Read failure means no data for this elevation, not a
                // failed volume.
                Err(e) if e.is_missing_data() => {
                    warn!(%timestamp, elevation, error = %e, "scan unavailable");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if scan.is_empty() {
                debug!(%timestamp, elevation, "empty scan, skipping");
                continue;
            }

            let n = self.process_scan(timestamp, &scan).await?;
            images += n;
            if n > 0 || self.all_channels_cached(timestamp, &scan).await? {
                produced.push(scan.elevation_deg());
            }
        }

        if !produced.is_empty() && !self.is_shutdown() {
            let volume = ProcessedVolume {
                timestamp,
                elevations: produced.clone(),
                processed_at: Utc::now(),
            };
            self.cache.set_volume(&volume).await?;
            self.notifier
                .broadcast(RadarEvent::VolumeProcessed {
                    timestamp,
                    elevations: produced,
                })
                .await;
        }

        info!(%timestamp, images, "volume done");
        Ok(images)
    }

    /// Render and cache every configured channel of one scan. A failing
    /// channel is logged and skipped; the scan's other channels proceed.
    async fn process_scan(
        &self,
        timestamp: DateTime<Utc>,
        scan: &PolarScan,
    ) -> RadarResult<usize> {
        let field = self.projector.project(scan);
        let spec = GridSpec::covering(
            &field.bbox().padded(self.config.grid_padding_deg),
            self.config.grid_width,
            self.config.grid_height,
        );
        let params = RasterizeParams::new(projection::max_ground_range(scan));

        let mut images = 0;
        for &channel in &self.config.channels {
            if self.is_shutdown() {
                break;
            }
            let Some(grid) = scan.channel(channel) else {
                continue;
            };

            let key = ImageKey::new(timestamp, scan.elevation_deg(), channel);
            if self.cache.has_image(&key).await? {
                debug!(%key, "image already cached");
                continue;
            }

            let mut filtered = grid.clone();
            self.config.filters.pipeline(channel).apply(&mut filtered);
            let raster = rasterize(scan, &filtered, &field, &spec, params);

            let bytes = match encode_raster(&raster, channel) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(%key, error = %e, "encoding failed, skipping channel");
                    continue;
                }
            };
            if let Err(e) = self.cache.set_image(&key, bytes).await {
                warn!(%key, error = %e, "cache write failed, skipping channel");
                continue;
            }

            self.notifier
                .broadcast(RadarEvent::ImageReady {
                    timestamp,
                    elevation_deg: scan.elevation_deg(),
                    channel,
                })
                .await;
            images += 1;
        }
        Ok(images)
    }

    /// Whether the scan's configured channels are all already in the cache.
    async fn all_channels_cached(
        &self,
        timestamp: DateTime<Utc>,
        scan: &PolarScan,
    ) -> RadarResult<bool> {
        let mut any = false;
        for &channel in &self.config.channels {
            if scan.channel(channel).is_none() {
                continue;
            }
            any = true;
            let key = ImageKey::new(timestamp, scan.elevation_deg(), channel);
            if !self.cache.has_image(&key).await? {
                return Ok(false);
            }
        }
        Ok(any)
    }
}
