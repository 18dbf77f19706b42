//! Monitoring Session
//!
//! The synchronous loop around one fatigue classifier: pull a sample from a
//! [`RatioSource`], classify it, push the output to a [`PresentationSink`].
//! Sources and sinks are injected per run so each session (uploaded video,
//! camera) stays isolated.

mod report;
mod runner;
mod sink;
mod source;
mod throttle;

pub use report::{EventRecord, FrameRecord, ReportBuilder, RiskLevel, SessionReport, SessionStatistics};
pub use runner::{Session, SessionSummary, PROGRESS_INTERVAL};
pub use sink::PresentationSink;
pub use source::{FrameSequence, JsonLinesSource, RatioSource, DEFAULT_FPS};
pub use throttle::{FrameThrottle, Throttled};

use fatigue::FatigueError;
use thiserror::Error;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Classifier error: {0}")]
    Classifier(#[from] FatigueError),

    #[error("Presentation sink failed: {0}")]
    Sink(String),

    #[error("Malformed sample on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
