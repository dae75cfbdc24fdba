//! Data directory watcher.
//!
//! A polling task diffs the directory's file set on an interval and pushes
//! new paths onto a queue. A single consumer debounces each path (so files
//! still being written settle), resolves it to a volume timestamp and kicks
//! off processing. Pipeline work never runs on the polling task.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use walkdir::WalkDir;

use scan_reader::volume_timestamp;

use crate::processor::PvolProcessor;

pub struct DirectoryWatcher {
    dir: PathBuf,
    poll_interval: Duration,
    debounce: Duration,
}

impl DirectoryWatcher {
    pub fn new(dir: impl Into<PathBuf>, poll_interval: Duration, debounce: Duration) -> Self {
        Self {
            dir: dir.into(),
            poll_interval,
            debounce,
        }
    }

    /// Start the poller and consumer tasks. The returned handle resolves
    /// once the processor's shutdown flag stops the poller and the queue
    /// drains.
    pub fn spawn(self, processor: Arc<PvolProcessor>) -> JoinHandle<()> {
        let (tx, rx) = mpsc::channel::<PathBuf>(64);

        let consumer = tokio::spawn(consume(rx, self.debounce, Arc::clone(&processor)));

        tokio::spawn(async move {
            let mut known: HashSet<PathBuf> = HashSet::new();
            let mut ticker = tokio::time::interval(self.poll_interval);
            while !processor.is_shutdown() {
                ticker.tick().await;
                for path in list_files(&self.dir) {
                    if known.insert(path.clone()) {
                        debug!(path = %path.display(), "new scan file");
                        if tx.send(path).await.is_err() {
                            return;
                        }
                    }
                }
            }
            drop(tx);
            let _ = consumer.await;
        })
    }
}

fn list_files(dir: &std::path::Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Debounce and dispatch queued paths, one at a time.
async fn consume(
    mut rx: mpsc::Receiver<PathBuf>,
    debounce: Duration,
    processor: Arc<PvolProcessor>,
) {
    while let Some(path) = rx.recv().await {
        tokio::time::sleep(debounce).await;
        let Some(timestamp) = volume_timestamp(&path) else {
            debug!(path = %path.display(), "no volume timestamp in filename, ignoring");
            continue;
        };

        // Detached: a slow volume must not hold up the queue.
        let processor = Arc::clone(&processor);
        tokio::spawn(async move {
            if let Err(e) = processor.request_pvol(timestamp).await {
                warn!(%timestamp, error = %e, "volume processing failed");
            }
        });
    }
}
