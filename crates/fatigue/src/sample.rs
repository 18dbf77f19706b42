//! Per-frame ratio measurement

use serde::{Deserialize, Serialize};

/// One processed frame's measurement.
///
/// `ear == 0.0` is the ratio source's "no usable face" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioSample {
    /// Monotonic capture time (seconds)
    pub timestamp: f64,
    /// Eye aspect ratio, averaged over both eyes
    pub ear: f64,
    /// Mouth aspect ratio
    pub mar: f64,
}

impl RatioSample {
    pub fn new(timestamp: f64, ear: f64, mar: f64) -> Self {
        Self { timestamp, ear, mar }
    }

    /// Sample for a frame where no face was found
    pub fn undetected(timestamp: f64) -> Self {
        Self {
            timestamp,
            ear: 0.0,
            mar: 0.0,
        }
    }

    /// Whether the ratio source reported a face at all
    pub fn has_face(&self) -> bool {
        self.ear > 0.0
    }
}
