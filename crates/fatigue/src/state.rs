//! Per-session classifier state

use crate::FatigueConfig;
use serde::{Deserialize, Serialize};
use sliding_window::{RollingMean, TimeWindow};

/// Debounced eye state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeState {
    #[default]
    Open,
    Closed,
}

/// Mutable state owned by exactly one classifier (tracked over a session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierState {
    /// Consecutive frames with averaged EAR at/below the closed threshold
    pub eye_closed_run: u32,

    /// Consecutive frames with averaged EAR above the closed threshold
    pub eye_open_run: u32,

    /// Consecutive frames with MAR above the yawn threshold
    pub mouth_open_run: u32,

    /// Frames spent in the confirmed closed state, confirming frames included
    pub closed_duration: u32,

    /// Current debounced eye state
    pub eye_state: EyeState,

    /// The current mouth-open run already produced a yawn event
    pub yawn_emitted_in_run: bool,

    /// The current fatigue episode already produced a fatigue event
    pub fatigue_latched: bool,

    /// Timestamp of the last fatigue event
    pub last_fatigue_event: Option<f64>,

    /// Timestamp of the last yawn event
    pub last_yawn_event: Option<f64>,

    /// Timestamp of the last accepted sample
    pub last_timestamp: Option<f64>,

    /// Blink timestamps inside the blink window
    pub recent_blinks: TimeWindow,

    /// Yawn timestamps inside the yawn window
    pub recent_yawns: TimeWindow,

    /// Rolling average over recent valid EAR samples
    pub ear_history: RollingMean,
}

impl ClassifierState {
    /// Fresh state sized for `config`
    pub fn new(config: &FatigueConfig) -> Self {
        Self {
            eye_closed_run: 0,
            eye_open_run: 0,
            mouth_open_run: 0,
            closed_duration: 0,
            eye_state: EyeState::Open,
            yawn_emitted_in_run: false,
            fatigue_latched: false,
            last_fatigue_event: None,
            last_yawn_event: None,
            last_timestamp: None,
            recent_blinks: TimeWindow::new(config.blink_window_seconds),
            recent_yawns: TimeWindow::new(config.yawn_window_seconds),
            ear_history: RollingMean::new(config.ear_history_length),
        }
    }

    /// Drop everything learned from the face signal after it was lost,
    /// ending any fatigue episode. Event timestamps and windows survive.
    pub fn clear_tracking(&mut self) {
        self.eye_closed_run = 0;
        self.eye_open_run = 0;
        self.mouth_open_run = 0;
        self.closed_duration = 0;
        self.eye_state = EyeState::Open;
        self.yawn_emitted_in_run = false;
        self.fatigue_latched = false;
        self.ear_history.clear();
    }

    /// Reset state (session start or user-triggered clear)
    pub fn reset(&mut self) {
        self.clear_tracking();
        self.last_fatigue_event = None;
        self.last_yawn_event = None;
        self.last_timestamp = None;
        self.recent_blinks.clear();
        self.recent_yawns.clear();
    }

    /// Prune both event windows relative to `now`
    pub fn prune_windows(&mut self, now: f64) {
        self.recent_blinks.prune(now);
        self.recent_yawns.prune(now);
    }
}
