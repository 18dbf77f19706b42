//! Sample Validator for Range and Ordering Checks

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// EAR valid range (0 = no face)
    pub ear_range: (f64, f64),
    /// MAR valid range
    pub mar_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ear_range: (0.0, f64::INFINITY),
            mar_range: (0.0, f64::INFINITY),
        }
    }
}

/// Validator for ratio samples
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate eye aspect ratio
    pub fn validate_ear(&self, ear: f64) -> Result<(), ValidationError> {
        self.validate_range("ear", ear, self.config.ear_range)
    }

    /// Validate mouth aspect ratio
    pub fn validate_mar(&self, mar: f64) -> Result<(), ValidationError> {
        self.validate_range("mar", mar, self.config.mar_range)
    }

    /// Validate that `next` does not precede `previous`
    pub fn validate_timestamp(
        &self,
        previous: Option<f64>,
        next: f64,
    ) -> Result<(), ValidationError> {
        if !next.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "timestamp",
                value: next,
            });
        }
        match previous {
            Some(previous) if next < previous => {
                Err(ValidationError::NonMonotonic { previous, next })
            }
            _ => Ok(()),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_ratios() {
        let validator = Validator::default();
        assert!(validator.validate_ear(0.0).is_ok());
        assert!(validator.validate_ear(0.31).is_ok());
        assert!(validator.validate_mar(0.75).is_ok());
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate_ear(-0.1),
            Err(ValidationError::OutOfRange {
                field: "ear",
                value: -0.1,
                min: 0.0,
                max: f64::INFINITY,
            })
        );
        assert!(validator.validate_mar(-1.0).is_err());
    }

    #[test]
    fn test_large_ratios_accepted_by_default() {
        let validator = Validator::default();
        assert!(validator.validate_ear(12.0).is_ok());
        assert!(validator.validate_mar(1.0e6).is_ok());
    }

    #[test]
    fn test_configured_upper_bound() {
        let validator = Validator::new(ValidationConfig {
            ear_range: (0.0, 1.0),
            mar_range: (0.0, 2.0),
        });
        assert!(validator.validate_ear(1.0).is_ok());
        assert!(matches!(
            validator.validate_ear(1.5),
            Err(ValidationError::OutOfRange { field: "ear", max, .. }) if max == 1.0
        ));
        assert!(validator.validate_mar(2.5).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let validator = Validator::default();
        assert!(matches!(
            validator.validate_mar(f64::NAN),
            Err(ValidationError::NotFinite { field: "mar", .. })
        ));
        assert!(validator.validate_timestamp(None, f64::INFINITY).is_err());
    }

    #[test]
    fn test_timestamp_ordering() {
        let validator = Validator::default();
        assert!(validator.validate_timestamp(None, 0.0).is_ok());
        assert!(validator.validate_timestamp(Some(1.0), 1.0).is_ok());
        assert!(validator.validate_timestamp(Some(1.0), 1.5).is_ok());
        assert_eq!(
            validator.validate_timestamp(Some(2.0), 1.9),
            Err(ValidationError::NonMonotonic {
                previous: 2.0,
                next: 1.9
            })
        );
    }

    proptest! {
        #[test]
        fn non_negative_values_accepted(ear in 0.0f64..1.0e9, mar in 0.0f64..1.0e9) {
            let validator = Validator::default();
            prop_assert!(validator.validate_ear(ear).is_ok());
            prop_assert!(validator.validate_mar(mar).is_ok());
        }
    }
}
