//! Driver Fatigue Classifier
//!
//! Turns a noisy per-frame stream of eye/mouth aspect ratios into:
//! - a debounced open/closed eye state
//! - blink, yawn and fatigue events with per-kind rate limiting
//! - a display status that is available on every frame
//!
//! Face detection and landmark regression stay outside this crate; the
//! [`geometry`] module only turns already-regressed landmarks into ratios.

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod geometry;
pub mod sample;
pub mod state;

pub use analysis::{ClassifierOutput, DisplayStatus, DriverCondition, EventKind, FatigueSign};
pub use classifier::FatigueClassifier;
pub use config::FatigueConfig;
pub use geometry::{FaceLandmarks, Point};
pub use sample::RatioSample;
pub use state::{ClassifierState, EyeState};

use ratio_validator::ValidationError;
use thiserror::Error;

/// Fatigue classifier error types
#[derive(Error, Debug)]
pub enum FatigueError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid sample: {0}")]
    InvalidSample(ValidationError),

    #[error("Non-monotonic timestamp: {0}")]
    NonMonotonicTimestamp(ValidationError),

    #[error("Invalid landmarks: {0}")]
    Landmarks(String),
}

impl From<ValidationError> for FatigueError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NonMonotonic { .. } => FatigueError::NonMonotonicTimestamp(err),
            other => FatigueError::InvalidSample(other),
        }
    }
}
