//! Directory watcher integration: file appears, image comes out.

use std::sync::Arc;
use std::time::Duration;

use pvol_processor::{
    BroadcastNotifier, DirectoryWatcher, ProcessorConfig, PvolProcessor, RadarEvent,
};
use radar_common::Channel;
use scan_reader::{DirectoryStore, FlatBinaryDecoder};
use storage::{ImageKey, MemoryCache, RadarCache};
use test_utils::generators::{scan_with_constant, test_timestamp};

#[tokio::test]
async fn test_new_file_triggers_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DirectoryStore::new(
        dir.path(),
        Arc::new(FlatBinaryDecoder),
    ));
    let cache = Arc::new(MemoryCache::new());
    let notifier = Arc::new(BroadcastNotifier::new(64));
    let mut events = notifier.subscribe();

    let config = ProcessorConfig {
        grid_width: 32,
        grid_height: 32,
        channels: vec![Channel::Reflectivity],
        ..ProcessorConfig::default()
    };
    let processor = Arc::new(PvolProcessor::new(
        store,
        Arc::clone(&cache) as Arc<dyn RadarCache>,
        Arc::clone(&notifier) as Arc<dyn pvol_processor::Notifier>,
        config,
    ));

    let watcher = DirectoryWatcher::new(
        dir.path(),
        Duration::from_millis(10),
        Duration::from_millis(5),
    );
    let handle = watcher.spawn(Arc::clone(&processor));

    let scan = scan_with_constant(8, 8, 40.0, -90.0, 0.5, 10.0);
    FlatBinaryDecoder::write(&dir.path().join("KAAA_20240615120000_0.5.scan"), &scan).unwrap();

    // Wait for the volume to finish.
    let deadline = Duration::from_secs(10);
    let processed = tokio::time::timeout(deadline, async {
        loop {
            match events.recv().await.unwrap() {
                RadarEvent::VolumeProcessed { timestamp, .. } => break timestamp,
                RadarEvent::ImageReady { .. } => continue,
            }
        }
    })
    .await
    .expect("volume never processed");
    assert_eq!(processed, test_timestamp());

    let key = ImageKey::new(test_timestamp(), 0.5, Channel::Reflectivity);
    assert!(cache.has_image(&key).await.unwrap());
    assert_eq!(cache.len().await, 1);

    processor.shutdown();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("watcher did not stop")
        .unwrap();
}
