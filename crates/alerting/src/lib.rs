//! Alerting System
//!
//! Live presentation helpers: alert deduplication for the event log,
//! severity mapping, EAR bands and the status label.

mod manager;
mod status;

pub use manager::{Alert, AlertConfig, AlertKind, AlertManager, AlertState};
pub use status::{status_key, status_line, EarBand};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Alert severity, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}
