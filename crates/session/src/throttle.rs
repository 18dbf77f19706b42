//! Frame-rate pacing for live sources

use crate::{RatioSource, SessionError};
use fatigue::RatioSample;
use tracing::trace;

/// Accepts at most `max_fps` samples per second of sample time
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    min_spacing: f64,
    last_accepted: Option<f64>,
    dropped: u64,
}

impl FrameThrottle {
    /// A non-positive or non-finite `max_fps` disables throttling
    pub fn new(max_fps: f64) -> Self {
        let min_spacing = if max_fps.is_finite() && max_fps > 0.0 {
            1.0 / max_fps
        } else {
            0.0
        };
        Self {
            min_spacing,
            last_accepted: None,
            dropped: 0,
        }
    }

    /// Whether a sample at `timestamp` should be processed
    pub fn accept(&mut self, timestamp: f64) -> bool {
        if let Some(last) = self.last_accepted {
            // Small tolerance so a steady 30fps feed passes a 30fps limit
            if timestamp - last < self.min_spacing - 1e-9 {
                self.dropped += 1;
                trace!(timestamp, "Frame dropped by throttle");
                return false;
            }
        }
        self.last_accepted = Some(timestamp);
        true
    }

    /// Samples rejected so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Ratio source adapter that skips samples arriving faster than `max_fps`
pub struct Throttled<S> {
    inner: S,
    throttle: FrameThrottle,
}

impl<S: RatioSource> Throttled<S> {
    pub fn new(inner: S, max_fps: f64) -> Self {
        Self {
            inner,
            throttle: FrameThrottle::new(max_fps),
        }
    }

    pub fn dropped(&self) -> u64 {
        self.throttle.dropped()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RatioSource> RatioSource for Throttled<S> {
    fn next_sample(&mut self) -> Result<Option<RatioSample>, SessionError> {
        while let Some(sample) = self.inner.next_sample()? {
            if self.throttle.accept(sample.timestamp) {
                return Ok(Some(sample));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameSequence;

    #[test]
    fn test_throttle_drops_fast_frames() {
        let mut throttle = FrameThrottle::new(10.0);
        assert!(throttle.accept(0.0));
        assert!(!throttle.accept(0.05));
        assert!(throttle.accept(0.1));
        assert_eq!(throttle.dropped(), 1);
    }

    #[test]
    fn test_zero_fps_disables_throttle() {
        let mut throttle = FrameThrottle::new(0.0);
        assert!(throttle.accept(0.0));
        assert!(throttle.accept(0.0));
    }

    #[test]
    fn test_throttled_source_halves_60fps_feed() {
        let frames = vec![(0.3, 0.1); 60];
        let mut source = Throttled::new(FrameSequence::new(60.0, frames), 30.0);

        let mut count = 0;
        while source.next_sample().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 30);
        assert_eq!(source.dropped(), 30);
    }
}
