//! Cache Cleaner
//!
//! Background task that periodically evicts expired responses.

use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use super::ResponseCache;

/// Outcome of one expiry pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub removed: usize,
    pub remaining: usize,
    pub capacity: usize,
}

impl SweepStats {
    /// Live entries still fill the cache, so new responses go uncached
    pub fn saturated(&self) -> bool {
        self.remaining >= self.capacity
    }
}

/// Background expiry task for [`ResponseCache`]
pub struct CacheCleaner {
    cache: ResponseCache,
    interval: Duration,
}

impl CacheCleaner {
    pub fn new(cache: ResponseCache, interval_secs: u64) -> Self {
        Self {
            cache,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Evict expired responses once and report what is left
    pub fn sweep(&self) -> SweepStats {
        let removed = self.cache.cleanup_expired();
        SweepStats {
            removed,
            remaining: self.cache.len(),
            capacity: self.cache.max_entries(),
        }
    }

    /// Run the cleaner (should be spawned as a task)
    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        info!(
            "Cache cleaner started, interval: {:?}, ttl: {:?}, capacity: {}",
            self.interval,
            self.cache.ttl(),
            self.cache.max_entries()
        );

        let mut was_saturated = false;
        loop {
            ticker.tick().await;
            let stats = self.sweep();
            if stats.removed > 0 {
                debug!(
                    removed = stats.removed,
                    remaining = stats.remaining,
                    "Evicted expired responses"
                );
            }

            let saturated = stats.saturated();
            if saturated && !was_saturated {
                warn!(
                    capacity = stats.capacity,
                    "Response cache full of live entries, new responses are not cached"
                );
            } else if !saturated && was_saturated {
                info!(remaining = stats.remaining, "Response cache has room again");
            }
            was_saturated = saturated;
        }
    }

    /// Spawn the cleaner as a background task
    pub fn spawn(cache: ResponseCache, interval_secs: u64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(Self::new(cache, interval_secs).run())
    }
}
