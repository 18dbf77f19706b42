//! Count-Bounded Rolling Mean

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of samples averaged (~170ms at 30fps)
pub const DEFAULT_CAPACITY: usize = 5;

/// Rolling mean over the most recent `capacity` samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingMean {
    /// Samples, oldest first
    samples: VecDeque<f64>,
    /// Maximum number of samples kept
    capacity: usize,
}

impl RollingMean {
    /// Create a new rolling mean (capacity is clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, evicting the oldest one when full
    pub fn push(&mut self, value: f64) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Mean of the samples currently held
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the window holds `capacity` samples
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for RollingMean {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_has_no_mean() {
        let mean = RollingMean::new(5);
        assert!(mean.mean().is_none());
        assert!(mean.is_empty());
    }

    #[test]
    fn test_partial_window_averages_what_it_has() {
        let mut mean = RollingMean::new(5);
        mean.push(0.3);
        mean.push(0.2);

        assert!((mean.mean().unwrap() - 0.25).abs() < 1e-9);
        assert_eq!(mean.len(), 2);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut mean = RollingMean::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            mean.push(v);
        }

        assert!(mean.is_full());
        assert!((mean.mean().unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(mean.latest(), Some(4.0));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut mean = RollingMean::new(0);
        mean.push(1.0);
        mean.push(2.0);

        assert_eq!(mean.capacity(), 1);
        assert_eq!(mean.mean(), Some(2.0));
    }

    proptest! {
        #[test]
        fn mean_stays_within_window_bounds(values in prop::collection::vec(0.0f64..1.0, 1..50), cap in 1usize..8) {
            let mut mean = RollingMean::new(cap);
            for &v in &values {
                mean.push(v);
            }

            let window = &values[values.len().saturating_sub(cap)..];
            let lo = window.iter().cloned().fold(f64::MAX, f64::min);
            let hi = window.iter().cloned().fold(f64::MIN, f64::max);
            let m = mean.mean().unwrap();
            prop_assert!(m >= lo - 1e-9 && m <= hi + 1e-9);
            prop_assert!(mean.len() <= cap);
        }
    }
}
