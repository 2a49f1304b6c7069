use std::sync::Mutex;

use ahash::AHashMap;

/// Fire-and-forget request statistics.
pub trait UsageCounter: Send + Sync {
    fn increment(&self, name: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUsageCounter;

impl UsageCounter for NoopUsageCounter {
    fn increment(&self, _name: &str) {}
}

/// Counts increments per name in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUsageCounter {
    counts: Mutex<AHashMap<String, u64>>,
}

impl InMemoryUsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for `name`, zero when never incremented.
    #[must_use]
    pub fn count(&self, name: &str) -> u64 {
        self.counts
            .lock()
            .map_or(0, |counts| counts.get(name).copied().unwrap_or(0))
    }
}

impl UsageCounter for InMemoryUsageCounter {
    fn increment(&self, name: &str) {
        // A poisoned lock only loses statistics.
        if let Ok(mut counts) = self.counts.lock() {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }
}
