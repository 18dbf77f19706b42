//! Validation Error Types

use thiserror::Error;

/// Errors during sample validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// NaN or infinite value
    #[error("{field} value {value} is not finite")]
    NotFinite { field: &'static str, value: f64 },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Timestamp went backwards within a session
    #[error("timestamp {next} precedes previous timestamp {previous}")]
    NonMonotonic { previous: f64, next: f64 },
}
