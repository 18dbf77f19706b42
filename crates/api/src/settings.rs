//! Server settings

use crate::rate_limit::RateLimitConfig;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use fatigue::FatigueConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment prefix, e.g. `MONITOR_BIND_ADDR` or
/// `MONITOR_FATIGUE__EAR_CLOSED_THRESHOLD`
pub const ENV_PREFIX: &str = "MONITOR";

/// Settings file looked up when none is given
pub const DEFAULT_CONFIG_FILE: &str = "monitor.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Stored sessions before the oldest is evicted
    pub max_sessions: usize,
    /// Frames accepted in one upload
    pub max_frames: usize,
    pub rate_limit: RateLimitConfig,
    /// Baseline classifier thresholds for uploaded sessions
    pub fatigue: FatigueConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            max_sessions: storage::DEFAULT_MAX_SESSIONS,
            // One hour at 30 fps
            max_frames: 108_000,
            rate_limit: RateLimitConfig::default(),
            fatigue: FatigueConfig::batch(),
        }
    }
}

impl ServerConfig {
    /// Builder seeded with the defaults. A partial table such as
    /// `[fatigue]` fills its missing keys from `FatigueConfig::batch()`
    fn builder() -> anyhow::Result<ConfigBuilder<DefaultState>> {
        let defaults = Config::try_from(&Self::default())?;
        Ok(Config::builder().add_source(defaults))
    }

    /// Layer the settings file (required only when given explicitly) under
    /// `MONITOR_*` environment variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = Self::builder()?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.fatigue.validate()?;
        info!("Server configuration loaded (bind: {})", config.bind_addr);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    fn from_toml(toml: &str) -> ServerConfig {
        ServerConfig::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_use_batch_thresholds() {
        let config = ServerConfig::default();
        assert_eq!(config.fatigue, FatigueConfig::batch());
        assert!(config.fatigue.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            bind_addr = "127.0.0.1:9000"

            [fatigue]
            ear_closed_threshold = 0.22
        "#;
        let config = from_toml(toml);

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.fatigue.ear_closed_threshold, 0.22);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_partial_fatigue_table_keeps_batch_values() {
        let config = from_toml("[fatigue]\near_closed_threshold = 0.22\n");
        let batch = FatigueConfig::batch();

        assert_eq!(config.fatigue.ear_closed_threshold, 0.22);
        assert_eq!(config.fatigue.ear_min_valid, 0.0);
        assert_eq!(config.fatigue.eye_confirm_frames, 1);
        assert_eq!(config.fatigue.min_yawn_frames, batch.min_yawn_frames);
        assert_eq!(config.fatigue.ear_history_length, batch.ear_history_length);
        assert_eq!(config.max_frames, ServerConfig::default().max_frames);
    }
}
