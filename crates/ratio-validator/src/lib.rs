//! Ratio Validation
//!
//! Range and ordering checks for the per-frame ratio stream. A ratio source
//! signals "no face" with an EAR of exactly zero, which is valid input here;
//! negative, non-finite or out-of-order values are caller errors.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, Validator};
