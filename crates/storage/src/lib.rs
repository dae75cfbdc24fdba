//! Cache backends for processed radar products.
//!
//! Rendered images and per-volume metadata are keyed by
//! (timestamp, elevation, channel). Two backends implement the same
//! capability trait: an in-process concurrent map for single-node
//! deployments and tests, and a Redis store with TTL expiry for
//! distributed setups.

pub mod key;
pub mod memory;
pub mod redis_cache;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use radar_common::{ProcessedVolume, RadarResult};

pub use key::ImageKey;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Capability interface for the radar product cache.
///
/// Entries are immutable once written; re-processing a timestamp must call
/// [`RadarCache::remove_volume`] first so stale entries never survive a
/// partial overwrite.
#[async_trait]
pub trait RadarCache: Send + Sync {
    /// Fetch a rendered image.
    async fn get_image(&self, key: &ImageKey) -> RadarResult<Option<Bytes>>;

    /// Store a rendered image.
    async fn set_image(&self, key: &ImageKey, data: Bytes) -> RadarResult<()>;

    /// Whether an image exists without fetching its bytes.
    async fn has_image(&self, key: &ImageKey) -> RadarResult<bool>;

    /// Fetch the processed-volume metadata for a timestamp.
    async fn get_volume(&self, timestamp: DateTime<Utc>) -> RadarResult<Option<ProcessedVolume>>;

    /// Record that a volume finished processing.
    async fn set_volume(&self, volume: &ProcessedVolume) -> RadarResult<()>;

    /// Delete the volume metadata and every per-elevation/channel image for
    /// a timestamp.
    async fn remove_volume(&self, timestamp: DateTime<Utc>) -> RadarResult<()>;
}
