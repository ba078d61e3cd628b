use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Deferred tile removal, keyed by tile key. The app's tick drives
/// `drain_due`; nothing here blocks. Scheduling the same tile again replaces
/// its deadline, and cancel is idempotent whether the deadline already
/// fired, was already canceled, or never existed.
#[derive(Debug, Default)]
pub struct RemovalScheduler {
    pending: HashMap<String, Instant>,
}

impl RemovalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, tile_key: &str, delay: Duration, now: Instant) {
        self.pending.insert(tile_key.to_string(), now + delay);
    }

    pub fn cancel(&mut self, tile_key: &str) {
        self.pending.remove(tile_key);
    }

    pub fn is_pending(&self, tile_key: &str) -> bool {
        self.pending.contains_key(tile_key)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every key whose deadline has passed, sorted for
    /// deterministic processing.
    pub fn drain_due(&mut self, now: Instant) -> Vec<String> {
        let mut due: Vec<String> = self
            .pending
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        due.sort();
        for key in &due {
            self.pending.remove(key);
        }
        due
    }
}
