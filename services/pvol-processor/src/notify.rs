//! Outbound event channel.
//!
//! The processor announces finished work over a [`Notifier`]; delivery is
//! fire-and-forget and never blocks or fails the pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use radar_common::Channel;

/// Event emitted by the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum RadarEvent {
    /// One rendered image was cached.
    ImageReady {
        timestamp: DateTime<Utc>,
        elevation_deg: f64,
        channel: Channel,
    },
    /// Every elevation of a volume has been handled.
    VolumeProcessed {
        timestamp: DateTime<Utc>,
        elevations: Vec<f64>,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn broadcast(&self, event: RadarEvent);
}

/// Fan-out notifier over a tokio broadcast channel.
///
/// Subscribers that lag or disconnect just miss events; `send` errors
/// (no receivers) are ignored.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<RadarEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RadarEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn broadcast(&self, event: RadarEvent) {
        let _ = self.sender.send(event);
    }
}

/// Notifier that only logs, for `--once` runs and tests.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn broadcast(&self, event: RadarEvent) {
        tracing::info!(?event, "event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();
        let event = RadarEvent::ImageReady {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
            elevation_deg: 0.5,
            channel: Channel::Reflectivity,
        };
        notifier.broadcast(event.clone()).await;
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_fine() {
        let notifier = BroadcastNotifier::new(8);
        notifier
            .broadcast(RadarEvent::VolumeProcessed {
                timestamp: Utc::now(),
                elevations: vec![0.5],
            })
            .await;
    }
}
