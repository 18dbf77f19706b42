//! Sliding Windows
//!
//! Provides the two bounded buffers the fatigue classifier keeps per session:
//! - a count-bounded rolling mean for smoothing landmark jitter
//! - a time-bounded window of event timestamps for rate scoring

mod rolling;
mod time_window;

pub use rolling::{RollingMean, DEFAULT_CAPACITY};
pub use time_window::TimeWindow;
