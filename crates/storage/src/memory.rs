//! In-process cache backend.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use radar_common::{ProcessedVolume, RadarResult};

use crate::{ImageKey, RadarCache};

/// Concurrent in-memory cache.
///
/// Suitable for single-node deployments and the test suite. No TTL:
/// entries live until their volume is removed or the process exits.
#[derive(Default)]
pub struct MemoryCache {
    images: RwLock<HashMap<String, Bytes>>,
    volumes: RwLock<HashMap<String, ProcessedVolume>>,
    stats: MemoryCacheStats,
}

/// Hit/miss counters, atomics for lock-free reads.
#[derive(Default)]
pub struct MemoryCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached images.
    pub async fn len(&self) -> usize {
        self.images.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.images.read().await.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.stats.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.stats.misses.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RadarCache for MemoryCache {
    async fn get_image(&self, key: &ImageKey) -> RadarResult<Option<Bytes>> {
        let result = self.images.read().await.get(&key.to_string()).cloned();
        match result {
            Some(data) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(data))
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set_image(&self, key: &ImageKey, data: Bytes) -> RadarResult<()> {
        self.images.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn has_image(&self, key: &ImageKey) -> RadarResult<bool> {
        Ok(self.images.read().await.contains_key(&key.to_string()))
    }

    async fn get_volume(&self, timestamp: DateTime<Utc>) -> RadarResult<Option<ProcessedVolume>> {
        Ok(self
            .volumes
            .read()
            .await
            .get(&ImageKey::volume_key(timestamp))
            .cloned())
    }

    async fn set_volume(&self, volume: &ProcessedVolume) -> RadarResult<()> {
        self.volumes
            .write()
            .await
            .insert(ImageKey::volume_key(volume.timestamp), volume.clone());
        Ok(())
    }

    async fn remove_volume(&self, timestamp: DateTime<Utc>) -> RadarResult<()> {
        let prefix = ImageKey::volume_prefix(timestamp);
        self.images
            .write()
            .await
            .retain(|key, _| !key.starts_with(&prefix));
        self.volumes
            .write()
            .await
            .remove(&ImageKey::volume_key(timestamp));
        Ok(())
    }
}
