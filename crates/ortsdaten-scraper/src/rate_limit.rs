//! Per-source minimum-interval request throttle.
//!
//! One limiter instance is shared (via `Arc`) across all concurrent
//! city tasks, so jobs hitting the same upstream serialize their
//! request issuance even when their downstream processing overlaps.
//! Keys are static source identifiers (`"overpass"`, `"unsplash"`,
//! `"pixabay"`), not jobs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Slot tracking the last issuance time for one source key. The inner
/// async mutex is held across the pacing sleep so concurrent callers
/// for the same key queue up instead of racing the timestamp.
type SourceSlot = Arc<tokio::sync::Mutex<Option<Instant>>>;

#[derive(Default)]
pub struct SourceRateLimiter {
    slots: Mutex<HashMap<&'static str, SourceSlot>>,
}

impl SourceRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends until at least `min_interval` has passed since the
    /// previous `wait` for `source_key`, then records the new issuance
    /// time. Calls for distinct keys never block each other.
    pub async fn wait(&self, source_key: &'static str, min_interval: Duration) {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(source_key).or_default())
        };

        let mut last = slot.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
