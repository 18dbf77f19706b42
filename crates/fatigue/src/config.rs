//! Fatigue classifier configuration

use crate::FatigueError;
use ::config::{Config, Environment, File, Source};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable prefix for configuration overrides
/// (e.g. `FATIGUE_EAR_CLOSED_THRESHOLD=0.25`)
pub const ENV_PREFIX: &str = "FATIGUE";

/// Classifier tunables. One immutable record per classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Averaged EAR at/below which eyes count as closed
    pub ear_closed_threshold: f64,

    /// EAR below this is a detection failure, not a closure
    pub ear_min_valid: f64,

    /// MAR strictly above which the mouth counts as open
    pub mar_yawn_threshold: f64,

    /// Consecutive confirming frames to flip the debounced eye state
    pub eye_confirm_frames: u32,

    /// Shortest closed duration (frames) counted as a blink
    pub min_blink_frames: u32,

    /// Longest closed duration (frames) counted as a blink.
    /// Anything longer is sustained closure.
    pub max_blink_frames: u32,

    /// Consecutive mouth-open frames to confirm a yawn
    pub min_yawn_frames: u32,

    /// Minimum spacing between two events of the same kind (seconds)
    pub min_event_interval_seconds: f64,

    /// Blink counting window (seconds)
    pub blink_window_seconds: f64,

    /// Yawn counting window (seconds)
    pub yawn_window_seconds: f64,

    /// Yawns inside the window that assert fatigue
    pub max_yawn_count_in_window: u32,

    /// Number of valid EAR samples in the rolling average
    pub ear_history_length: usize,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            ear_closed_threshold: 0.27,
            ear_min_valid: 0.2,
            mar_yawn_threshold: 0.6,
            eye_confirm_frames: 2,
            min_blink_frames: 2,
            max_blink_frames: 7,
            min_yawn_frames: 15,
            min_event_interval_seconds: 5.0,
            blink_window_seconds: 300.0,
            yawn_window_seconds: 60.0,
            max_yawn_count_in_window: 3,
            ear_history_length: 5,
        }
    }
}

impl FatigueConfig {
    /// Thresholds used for offline processing of uploaded recordings.
    /// Only the zero sentinel counts as a missing face and a single
    /// frame confirms a state change.
    pub fn batch() -> Self {
        Self {
            ear_closed_threshold: 0.25,
            ear_min_valid: 0.0,
            mar_yawn_threshold: 0.6,
            eye_confirm_frames: 1,
            min_blink_frames: 1,
            min_yawn_frames: 3,
            ear_history_length: 1,
            ..Default::default()
        }
    }

    /// Check the record for values the classifier cannot run with
    pub fn validate(&self) -> Result<(), FatigueError> {
        let ratios = [
            ("ear_closed_threshold", self.ear_closed_threshold),
            ("ear_min_valid", self.ear_min_valid),
            ("mar_yawn_threshold", self.mar_yawn_threshold),
            ("min_event_interval_seconds", self.min_event_interval_seconds),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(FatigueError::Config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        let windows = [
            ("blink_window_seconds", self.blink_window_seconds),
            ("yawn_window_seconds", self.yawn_window_seconds),
        ];
        for (name, value) in windows {
            if !value.is_finite() || value <= 0.0 {
                return Err(FatigueError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let counts = [
            ("eye_confirm_frames", self.eye_confirm_frames as usize),
            ("min_yawn_frames", self.min_yawn_frames as usize),
            ("max_yawn_count_in_window", self.max_yawn_count_in_window as usize),
            ("ear_history_length", self.ear_history_length),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(FatigueError::Config(format!("{name} must be at least 1")));
            }
        }

        if self.ear_min_valid > self.ear_closed_threshold {
            return Err(FatigueError::Config(format!(
                "ear_min_valid ({}) exceeds ear_closed_threshold ({}); eyes could never register as closed",
                self.ear_min_valid, self.ear_closed_threshold
            )));
        }

        if self.min_blink_frames > self.max_blink_frames {
            return Err(FatigueError::Config(format!(
                "min_blink_frames ({}) exceeds max_blink_frames ({})",
                self.min_blink_frames, self.max_blink_frames
            )));
        }

        Ok(())
    }

    /// Load from an optional file (TOML, YAML or JSON by extension) layered
    /// under `FATIGUE_*` environment variables. Missing fields keep defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, FatigueError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading fatigue configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an arbitrary `config` source without environment layering
    pub fn from_source<S>(source: S) -> Result<Self, FatigueError>
    where
        S: Source + Send + Sync + 'static,
    {
        let config: Self = Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    #[test]
    fn test_default_is_valid() {
        assert!(FatigueConfig::default().validate().is_ok());
        assert!(FatigueConfig::batch().validate().is_ok());
    }

    #[test]
    fn test_blink_band_inverted() {
        let config = FatigueConfig {
            min_blink_frames: 9,
            max_blink_frames: 7,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, FatigueError::Config(msg) if msg.contains("min_blink_frames")));
    }

    #[test]
    fn test_min_valid_above_closed_threshold() {
        let config = FatigueConfig {
            ear_min_valid: 0.3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_confirm_frames_rejected() {
        let config = FatigueConfig {
            eye_confirm_frames: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let config = FatigueConfig {
            mar_yawn_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FatigueConfig {
            yawn_window_seconds: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            ear_closed_threshold = 0.3
            min_yawn_frames = 10
        "#;
        let config = FatigueConfig::from_source(File::from_str(toml, FileFormat::Toml)).unwrap();

        assert_eq!(config.ear_closed_threshold, 0.3);
        assert_eq!(config.min_yawn_frames, 10);
        assert_eq!(config.max_blink_frames, 7);
        assert_eq!(config.ear_history_length, 5);
    }

    #[test]
    fn test_invalid_file_contents_rejected() {
        let toml = "min_blink_frames = 10\nmax_blink_frames = 3\n";
        let result = FatigueConfig::from_source(File::from_str(toml, FileFormat::Toml));
        assert!(matches!(result, Err(FatigueError::Config(_))));
    }

    #[test]
    fn test_serde_roundtrip_json() {
        let config = FatigueConfig::batch();
        let json = serde_json::to_string(&config).unwrap();
        let back: FatigueConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
