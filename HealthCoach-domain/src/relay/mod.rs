//! Heart rate relay
//!
//! Keeps the most recent heart rate sample in memory and fans every new
//! sample out to live subscribers (one per WebSocket connection).
//!
//! The cache is written and the update broadcast while the same write lock is
//! held, so subscribers observe updates in cache-write order and the last
//! message any subscriber received always equals the cached value. Publishes
//! are last-write-wins: a sample with an older timestamp that arrives later
//! still replaces the cached value.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::entities::heart_rate::LatestHeartRate;

/// Default number of updates buffered per subscriber before it starts lagging
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Relay shared between the HTTP handlers and the WebSocket connections
pub type SharedRelay = Arc<HeartRateRelay>;

/// In-memory latest-value cache with broadcast fan-out
#[derive(Debug)]
pub struct HeartRateRelay {
    latest: RwLock<LatestHeartRate>,
    sender: broadcast::Sender<LatestHeartRate>,
}

impl Default for HeartRateRelay {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl HeartRateRelay {
    /// Create a relay whose subscribers buffer at most `capacity` updates.
    /// Starts from `{heartRate: null, timestamp: null, sampleCount: 0}`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            latest: RwLock::new(LatestHeartRate::default()),
            sender,
        }
    }

    /// Create a relay wrapped for sharing
    pub fn shared(capacity: usize) -> SharedRelay {
        Arc::new(Self::new(capacity))
    }

    /// Current cached value
    pub async fn latest(&self) -> LatestHeartRate {
        self.latest.read().await.clone()
    }

    /// Replace the cached value and push it to every subscriber
    pub async fn publish(&self, update: LatestHeartRate) -> LatestHeartRate {
        let mut latest = self.latest.write().await;
        *latest = update.clone();

        // An error only means nobody is listening
        let delivered = self.sender.send(update.clone()).unwrap_or(0);
        debug!("Heart rate update delivered to {} subscriber(s)", delivered);

        update
    }

    /// Subscribe to future updates and return the value current at the time
    /// of subscription. Every update published afterwards is delivered.
    pub async fn subscribe(&self) -> (LatestHeartRate, broadcast::Receiver<LatestHeartRate>) {
        // Holding the read lock keeps publishers out between snapshot and subscribe
        let latest = self.latest.read().await;
        let receiver = self.sender.subscribe();
        info!("New heart rate subscriber, total: {}", self.sender.receiver_count());
        (latest.clone(), receiver)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
