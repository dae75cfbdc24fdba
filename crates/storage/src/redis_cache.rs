//! Redis cache backend.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::time::Duration;

use radar_common::{ProcessedVolume, RadarError, RadarResult};

use crate::{ImageKey, RadarCache};

/// Redis-backed cache with TTL expiry.
///
/// The multiplexed connection is cheaply cloneable, so each call clones it
/// rather than holding a lock across await points.
pub struct RedisCache {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisCache {
    /// Connect to Redis with the default 24 hour TTL.
    pub async fn connect(redis_url: &str) -> RadarResult<Self> {
        Self::connect_with_ttl(redis_url, Duration::from_secs(24 * 3600)).await
    }

    pub async fn connect_with_ttl(redis_url: &str, ttl: Duration) -> RadarResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| RadarError::CacheError(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| RadarError::CacheError(format!("Redis connection failed: {}", e)))?;

        Ok(Self { conn, ttl })
    }

    /// Delete keys matching a pattern, returning the count removed.
    async fn delete_by_pattern(&self, pattern: &str) -> RadarResult<u64> {
        let mut conn = self.conn.clone();

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await
            .map_err(|e| RadarError::CacheError(format!("Pattern search failed: {}", e)))?;

        if keys.is_empty() {
            return Ok(0);
        }

        let count = keys.len() as u64;
        for key in keys {
            let _: () = conn
                .del(&key)
                .await
                .map_err(|e| RadarError::CacheError(format!("Cache delete failed: {}", e)))?;
        }

        Ok(count)
    }
}

#[async_trait]
impl RadarCache for RedisCache {
    async fn get_image(&self, key: &ImageKey) -> RadarResult<Option<Bytes>> {
        let mut conn = self.conn.clone();

        let result: Option<Vec<u8>> = conn
            .get(key.to_string())
            .await
            .map_err(|e| RadarError::CacheError(format!("Cache get failed: {}", e)))?;

        Ok(result.map(Bytes::from))
    }

    async fn set_image(&self, key: &ImageKey, data: Bytes) -> RadarResult<()> {
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(key.to_string(), data.as_ref(), self.ttl.as_secs())
            .await
            .map_err(|e| RadarError::CacheError(format!("Cache set failed: {}", e)))?;

        Ok(())
    }

    async fn has_image(&self, key: &ImageKey) -> RadarResult<bool> {
        let mut conn = self.conn.clone();

        let exists: bool = conn
            .exists(key.to_string())
            .await
            .map_err(|e| RadarError::CacheError(format!("Cache exists check failed: {}", e)))?;

        Ok(exists)
    }

    async fn get_volume(&self, timestamp: DateTime<Utc>) -> RadarResult<Option<ProcessedVolume>> {
        let mut conn = self.conn.clone();

        let result: Option<String> = conn
            .get(ImageKey::volume_key(timestamp))
            .await
            .map_err(|e| RadarError::CacheError(format!("Cache get failed: {}", e)))?;

        match result {
            Some(json) => {
                let volume: ProcessedVolume = serde_json::from_str(&json)
                    .map_err(|e| RadarError::CacheError(format!("Corrupt volume entry: {}", e)))?;
                Ok(Some(volume))
            }
            None => Ok(None),
        }
    }

    async fn set_volume(&self, volume: &ProcessedVolume) -> RadarResult<()> {
        let mut conn = self.conn.clone();

        let json = serde_json::to_string(volume)
            .map_err(|e| RadarError::CacheError(format!("Volume serialization failed: {}", e)))?;

        conn.set_ex::<_, _, ()>(
            ImageKey::volume_key(volume.timestamp),
            json,
            self.ttl.as_secs(),
        )
        .await
        .map_err(|e| RadarError::CacheError(format!("Cache set failed: {}", e)))?;

        Ok(())
    }

    async fn remove_volume(&self, timestamp: DateTime<Utc>) -> RadarResult<()> {
        let pattern = format!("{}*", ImageKey::volume_prefix(timestamp));
        let removed = self.delete_by_pattern(&pattern).await?;
        tracing::debug!(%timestamp, removed, "removed cached volume images");

        let mut conn = self.conn.clone();
        let _: () = conn
            .del(ImageKey::volume_key(timestamp))
            .await
            .map_err(|e| RadarError::CacheError(format!("Cache delete failed: {}", e)))?;

        Ok(())
    }
}
