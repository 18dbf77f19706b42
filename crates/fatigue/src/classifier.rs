//! Per-frame fatigue classifier
//!
//! Eye dimension: a two-state debounce (`Open`/`Closed`) gated by
//! `eye_confirm_frames` consecutive confirming frames. The length of each
//! confirmed closure decides between noise, a blink, and sustained closure.
//!
//! Mouth dimension: a consecutive-frame counter that confirms at most one
//! yawn per open-mouth run, re-armed by the event interval.
//!
//! Fatigue is re-evaluated on every frame but reported once per episode,
//! and never more often than `min_event_interval_seconds`.

use crate::analysis::{ClassifierOutput, DisplayStatus, FatigueSign};
use crate::state::{ClassifierState, EyeState};
use crate::{FatigueConfig, FatigueError, RatioSample};
use ratio_validator::Validator;
use tracing::{debug, info};

/// Fatigue classifier for a single video or camera session
#[derive(Debug, Clone)]
pub struct FatigueClassifier {
    config: FatigueConfig,
    validator: Validator,
    state: ClassifierState,
}

impl FatigueClassifier {
    /// Create a classifier, rejecting invalid configuration
    pub fn new(config: FatigueConfig) -> Result<Self, FatigueError> {
        config.validate()?;
        info!(
            ear_closed_threshold = config.ear_closed_threshold,
            mar_yawn_threshold = config.mar_yawn_threshold,
            eye_confirm_frames = config.eye_confirm_frames,
            "Creating fatigue classifier"
        );
        Ok(Self {
            state: ClassifierState::new(&config),
            validator: Validator::default(),
            config,
        })
    }

    /// Classify one frame.
    ///
    /// Returns an error (leaving state untouched) for negative or
    /// non-finite ratios and for timestamps earlier than the previous one.
    pub fn update(
        &mut self,
        ear: f64,
        mar: f64,
        timestamp: f64,
    ) -> Result<ClassifierOutput, FatigueError> {
        self.validator.validate_ear(ear)?;
        self.validator.validate_mar(mar)?;
        self.validator
            .validate_timestamp(self.state.last_timestamp, timestamp)?;

        self.state.last_timestamp = Some(timestamp);
        self.state.prune_windows(timestamp);

        if ear <= 0.0 || ear < self.config.ear_min_valid {
            return Ok(self.undetected(ear, mar, timestamp));
        }

        self.state.ear_history.push(ear);
        let averaged = self.state.ear_history.mean().unwrap_or(ear);

        let blink_detected = self.update_eyes(averaged, timestamp);
        let yawn_event_fired = self.update_mouth(mar, timestamp);
        let signs = self.fatigue_signs();
        let fatigue_event_fired = self.update_fatigue(&signs, timestamp);

        Ok(ClassifierOutput {
            fatigue_event_fired,
            yawn_event_fired,
            blink_detected,
            status: self.status(timestamp, ear, Some(averaged), mar, signs),
        })
    }

    /// Classify a [`RatioSample`]
    pub fn update_sample(&mut self, sample: &RatioSample) -> Result<ClassifierOutput, FatigueError> {
        self.update(sample.ear, sample.mar, sample.timestamp)
    }

    /// Clear all counters, windows and timestamps
    pub fn reset(&mut self) {
        debug!("Resetting fatigue classifier state");
        self.state.reset();
    }

    pub fn config(&self) -> &FatigueConfig {
        &self.config
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn eye_state(&self) -> EyeState {
        self.state.eye_state
    }

    /// Missing face: assume awake and forget the partial runs.
    fn undetected(&mut self, ear: f64, mar: f64, timestamp: f64) -> ClassifierOutput {
        if self.state.eye_state == EyeState::Closed || self.state.mouth_open_run > 0 {
            debug!(timestamp, ear, "Face lost, clearing eye and mouth runs");
        }
        self.state.clear_tracking();

        let mut status = self.status(timestamp, ear, None, mar, Vec::new());
        status.face_detected = false;

        ClassifierOutput {
            fatigue_event_fired: false,
            yawn_event_fired: false,
            blink_detected: false,
            status,
        }
    }

    /// Advance the eye debounce. Returns true when a blink completed.
    fn update_eyes(&mut self, averaged: f64, timestamp: f64) -> bool {
        let config = &self.config;
        let state = &mut self.state;

        let closed = averaged <= config.ear_closed_threshold;
        if closed {
            state.eye_closed_run = state.eye_closed_run.saturating_add(1);
            state.eye_open_run = 0;
        } else {
            state.eye_open_run = state.eye_open_run.saturating_add(1);
            state.eye_closed_run = 0;
        }

        match state.eye_state {
            EyeState::Open => {
                if state.eye_closed_run >= config.eye_confirm_frames {
                    state.eye_state = EyeState::Closed;
                    state.closed_duration = state.eye_closed_run;
                    debug!(timestamp, averaged, "Eyes confirmed closed");
                }
                false
            }
            EyeState::Closed if closed => {
                state.closed_duration = state.closed_duration.saturating_add(1);
                false
            }
            EyeState::Closed => {
                if state.eye_open_run < config.eye_confirm_frames {
                    return false;
                }

                state.eye_state = EyeState::Open;
                let duration = std::mem::take(&mut state.closed_duration);
                debug!(timestamp, duration, "Eyes confirmed open");

                if (config.min_blink_frames..=config.max_blink_frames).contains(&duration) {
                    state.recent_blinks.push(timestamp);
                    debug!(
                        timestamp,
                        duration,
                        blinks = state.recent_blinks.len(),
                        "Blink recorded"
                    );
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Advance the yawn counter. Returns true when a yawn event fired.
    fn update_mouth(&mut self, mar: f64, timestamp: f64) -> bool {
        let config = &self.config;
        let state = &mut self.state;

        if mar <= config.mar_yawn_threshold {
            state.mouth_open_run = 0;
            state.yawn_emitted_in_run = false;
            return false;
        }

        state.mouth_open_run = state.mouth_open_run.saturating_add(1);
        if state.mouth_open_run < config.min_yawn_frames || state.yawn_emitted_in_run {
            return false;
        }

        if !interval_elapsed(
            state.last_yawn_event,
            timestamp,
            config.min_event_interval_seconds,
        ) {
            debug!(timestamp, "Yawn suppressed: within event interval");
            return false;
        }

        state.yawn_emitted_in_run = true;
        state.last_yawn_event = Some(timestamp);
        state.recent_yawns.push(timestamp);
        info!(
            timestamp,
            mar,
            yawns_in_window = state.recent_yawns.len(),
            "Yawn detected"
        );
        true
    }

    /// Reasons fatigue is asserted on the current frame
    fn fatigue_signs(&self) -> Vec<FatigueSign> {
        let mut signs = Vec::new();

        if self.state.eye_state == EyeState::Closed
            && self.state.closed_duration > self.config.max_blink_frames
        {
            signs.push(FatigueSign::SustainedEyeClosure {
                closed_frames: self.state.closed_duration,
            });
        }

        let yawns = self.state.recent_yawns.len();
        if yawns >= self.config.max_yawn_count_in_window as usize {
            signs.push(FatigueSign::FrequentYawning {
                yawns,
                window_seconds: self.config.yawn_window_seconds,
            });
        }

        signs
    }

    /// Edge-trigger and rate-limit fatigue events. Returns true when one fired.
    fn update_fatigue(&mut self, signs: &[FatigueSign], timestamp: f64) -> bool {
        let state = &mut self.state;

        if signs.is_empty() {
            if state.fatigue_latched {
                debug!(timestamp, "Fatigue episode ended");
            }
            state.fatigue_latched = false;
            return false;
        }

        if state.fatigue_latched {
            return false;
        }

        if !interval_elapsed(
            state.last_fatigue_event,
            timestamp,
            self.config.min_event_interval_seconds,
        ) {
            debug!(timestamp, "Fatigue event suppressed: within event interval");
            return false;
        }

        state.fatigue_latched = true;
        state.last_fatigue_event = Some(timestamp);
        info!(timestamp, ?signs, "Fatigue detected");
        true
    }

    fn status(
        &self,
        timestamp: f64,
        ear: f64,
        averaged_ear: Option<f64>,
        mar: f64,
        fatigue_signs: Vec<FatigueSign>,
    ) -> DisplayStatus {
        DisplayStatus {
            timestamp,
            face_detected: true,
            current_ear: ear,
            averaged_ear,
            current_mar: mar,
            eye_state: self.state.eye_state,
            fatigue_asserted: !fatigue_signs.is_empty(),
            fatigue_signs,
            blink_count_in_window: self.state.recent_blinks.len(),
            yawn_count_in_window: self.state.recent_yawns.len(),
            mouth_open_run: self.state.mouth_open_run,
        }
    }
}

fn interval_elapsed(last: Option<f64>, now: f64, interval: f64) -> bool {
    last.map_or(true, |last| now - last >= interval)
}
