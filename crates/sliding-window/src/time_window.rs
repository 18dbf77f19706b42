//! Time-Bounded Timestamp Window

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Ordered timestamps (seconds) no older than `length_seconds`
/// relative to the last `prune` call.
///
/// Timestamps must be pushed in non-decreasing order; pruning only
/// inspects the front of the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    entries: VecDeque<f64>,
    length_seconds: f64,
}

impl TimeWindow {
    /// Create an empty window covering `length_seconds`
    pub fn new(length_seconds: f64) -> Self {
        Self {
            entries: VecDeque::new(),
            length_seconds,
        }
    }

    /// Record an event timestamp
    pub fn push(&mut self, timestamp: f64) {
        self.entries.push_back(timestamp);
    }

    /// Drop entries older than the window relative to `now`.
    /// Returns the number of entries removed.
    pub fn prune(&mut self, now: f64) -> usize {
        let mut removed = 0;
        while let Some(&oldest) = self.entries.front() {
            if now - oldest > self.length_seconds {
                self.entries.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Window length in seconds
    pub fn length_seconds(&self) -> f64 {
        self.length_seconds
    }

    /// Most recent timestamp
    pub fn latest(&self) -> Option<f64> {
        self.entries.back().copied()
    }

    /// Iterate timestamps, oldest first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
