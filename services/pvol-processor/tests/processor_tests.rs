//! End-to-end processor behavior against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pvol_processor::{
    BroadcastNotifier, ProcessOutcome, ProcessorConfig, PvolProcessor, RadarEvent,
};
use radar_common::{Channel, PolarScan, RadarResult};
use scan_reader::{MemoryStore, ScanStore};
use storage::{ImageKey, MemoryCache, RadarCache};
use test_utils::generators::{scan_with_constant, test_timestamp};

fn test_config() -> ProcessorConfig {
    ProcessorConfig {
        grid_width: 32,
        grid_height: 32,
        channels: vec![Channel::Reflectivity],
        ..ProcessorConfig::default()
    }
}

/// Store wrapper that yields to the scheduler, so a second concurrent
/// request observes the first one in flight.
struct SlowStore(MemoryStore);

#[async_trait]
impl ScanStore for SlowStore {
    async fn timestamps(&self) -> RadarResult<Vec<DateTime<Utc>>> {
        self.0.timestamps().await
    }

    async fn elevations(&self, timestamp: DateTime<Utc>) -> RadarResult<Vec<f64>> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.0.elevations(timestamp).await
    }

    async fn scan(
        &self,
        timestamp: DateTime<Utc>,
        elevation_deg: f64,
    ) -> RadarResult<Option<Arc<PolarScan>>> {
        self.0.scan(timestamp, elevation_deg).await
    }
}

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for elevation in [0.5, 1.5] {
        store
            .insert(scan_with_constant(8, 8, 40.0, -90.0, elevation, 10.0))
            .await;
    }
    store
}

#[tokio::test]
async fn test_concurrent_requests_coalesce() {
    let store = Arc::new(SlowStore(seeded_store().await));
    let cache = Arc::new(MemoryCache::new());
    let notifier = Arc::new(BroadcastNotifier::new(64));
    let mut events = notifier.subscribe();

    let processor = PvolProcessor::new(
        store,
        Arc::clone(&cache) as Arc<dyn RadarCache>,
        notifier,
        test_config(),
    );

    let ts = test_timestamp();
    let (a, b) = tokio::join!(processor.request_pvol(ts), processor.request_pvol(ts));
    let outcomes = [a.unwrap(), b.unwrap()];

    assert!(outcomes.contains(&ProcessOutcome::Skipped));
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, ProcessOutcome::Completed { images: 2 })));

    // Exactly one full run: one image per elevation, one volume event.
    assert_eq!(cache.len().await, 2);
    let mut volume_events = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, RadarEvent::VolumeProcessed { .. }) {
            volume_events += 1;
        }
    }
    assert_eq!(volume_events, 1);
}

#[tokio::test]
async fn test_rerun_skips_cached_images() {
    let store = Arc::new(seeded_store().await);
    let cache = Arc::new(MemoryCache::new());
    let notifier = Arc::new(BroadcastNotifier::new(64));

    let processor = PvolProcessor::new(
        store,
        Arc::clone(&cache) as Arc<dyn RadarCache>,
        notifier,
        test_config(),
    );

    let ts = test_timestamp();
    let first = processor.request_pvol(ts).await.unwrap();
    assert_eq!(first, ProcessOutcome::Completed { images: 2 });

    let second = processor.request_pvol(ts).await.unwrap();
    assert_eq!(second, ProcessOutcome::Completed { images: 0 });
    assert_eq!(cache.len().await, 2);

    // Volume metadata still records both elevations.
    let volume = cache.get_volume(ts).await.unwrap().unwrap();
    assert_eq!(volume.elevations, vec![0.5, 1.5]);
}

#[tokio::test]
async fn test_reprocess_renders_again() {
    let store = Arc::new(seeded_store().await);
    let cache = Arc::new(MemoryCache::new());
    let notifier = Arc::new(BroadcastNotifier::new(64));

    let processor = PvolProcessor::new(
        store,
        Arc::clone(&cache) as Arc<dyn RadarCache>,
        notifier,
        test_config(),
    );

    let ts = test_timestamp();
    processor.request_pvol(ts).await.unwrap();
    let outcome = processor.reprocess(ts).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Completed { images: 2 });
}

#[tokio::test]
async fn test_unknown_volume_renders_nothing() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let notifier = Arc::new(BroadcastNotifier::new(64));

    let processor = PvolProcessor::new(
        store,
        Arc::clone(&cache) as Arc<dyn RadarCache>,
        notifier,
        test_config(),
    );

    let outcome = processor.request_pvol(test_timestamp()).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Completed { images: 0 });
    assert!(cache.is_empty().await);
    assert!(cache.get_volume(test_timestamp()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cached_images_round_trip_bytes() {
    let store = Arc::new(seeded_store().await);
    let cache = Arc::new(MemoryCache::new());
    let notifier = Arc::new(BroadcastNotifier::new(64));

    let processor = PvolProcessor::new(
        store,
        Arc::clone(&cache) as Arc<dyn RadarCache>,
        notifier,
        test_config(),
    );
    processor.request_pvol(test_timestamp()).await.unwrap();

    let key = ImageKey::new(test_timestamp(), 0.5, Channel::Reflectivity);
    let bytes = cache.get_image(&key).await.unwrap().unwrap();
    // PNG signature.
    assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
}
