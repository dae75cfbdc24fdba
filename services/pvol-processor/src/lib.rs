//! Background polar-volume processor.
//!
//! Watches a directory of radar scan files, and for every volume renders
//! one image per (elevation, channel) into the product cache, announcing
//! results over a broadcast channel.

pub mod config;
pub mod notify;
pub mod processor;
pub mod watcher;

pub use config::{CacheBackend, FilterConfig, ProcessorConfig};
pub use notify::{BroadcastNotifier, LogNotifier, Notifier, RadarEvent};
pub use processor::{ProcessOutcome, PvolProcessor};
pub use watcher::DirectoryWatcher;
