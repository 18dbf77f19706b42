//! Classifier outputs and display status

use crate::state::EyeState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete events emitted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Fatigue newly asserted (rate limited)
    Fatigue,
    /// Yawn confirmed (rate limited)
    Yawn,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatigue => "fatigue",
            Self::Yawn => "yawn",
        }
    }
}

/// Reason fatigue is currently asserted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sign", rename_all = "snake_case")]
pub enum FatigueSign {
    /// Eyes confirmed closed for longer than a blink
    SustainedEyeClosure { closed_frames: u32 },

    /// Too many yawns inside the yawn window
    FrequentYawning { yawns: usize, window_seconds: f64 },
}

impl fmt::Display for FatigueSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SustainedEyeClosure { closed_frames } => {
                write!(f, "sustained eye closure ({closed_frames} frames)")
            }
            Self::FrequentYawning {
                yawns,
                window_seconds,
            } => write!(f, "frequent yawning ({yawns} in {window_seconds:.0}s)"),
        }
    }
}

/// Coarse driver condition for labels and colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverCondition {
    /// No usable face in the frame
    Undetected,
    Awake,
    Fatigued,
}

/// Status produced on every frame, independent of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayStatus {
    /// Sample timestamp (seconds)
    pub timestamp: f64,

    /// Whether the frame carried a usable face
    pub face_detected: bool,

    /// Raw EAR from the ratio source
    pub current_ear: f64,

    /// Rolling-average EAR (absent when the face is undetected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub averaged_ear: Option<f64>,

    /// Raw MAR from the ratio source
    pub current_mar: f64,

    /// Debounced eye state
    pub eye_state: EyeState,

    /// Whether fatigue is asserted on this frame
    pub fatigue_asserted: bool,

    /// Why fatigue is asserted (empty otherwise)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fatigue_signs: Vec<FatigueSign>,

    /// Blinks inside the blink window
    pub blink_count_in_window: usize,

    /// Yawns inside the yawn window
    pub yawn_count_in_window: usize,

    /// Consecutive mouth-open frames so far
    pub mouth_open_run: u32,
}

impl DisplayStatus {
    pub fn condition(&self) -> DriverCondition {
        if !self.face_detected {
            DriverCondition::Undetected
        } else if self.fatigue_asserted {
            DriverCondition::Fatigued
        } else {
            DriverCondition::Awake
        }
    }

    /// Whether the mouth is open on this frame
    pub fn mouth_open(&self) -> bool {
        self.mouth_open_run > 0
    }
}

/// Result of one `update` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    /// A fatigue event fired on this frame
    pub fatigue_event_fired: bool,

    /// A yawn event fired on this frame
    pub yawn_event_fired: bool,

    /// A blink completed on this frame
    pub blink_detected: bool,

    /// Current display status
    pub status: DisplayStatus,
}

impl ClassifierOutput {
    /// Check if any event fired on this frame
    pub fn has_events(&self) -> bool {
        self.fatigue_event_fired || self.yawn_event_fired
    }

    /// Events fired on this frame, fatigue first
    pub fn events(&self) -> Vec<EventKind> {
        let mut events = Vec::new();
        if self.fatigue_event_fired {
            events.push(EventKind::Fatigue);
        }
        if self.yawn_event_fired {
            events.push(EventKind::Yawn);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> DisplayStatus {
        DisplayStatus {
            timestamp: 1.0,
            face_detected: true,
            current_ear: 0.31,
            averaged_ear: Some(0.3),
            current_mar: 0.2,
            eye_state: EyeState::Open,
            fatigue_asserted: false,
            fatigue_signs: Vec::new(),
            blink_count_in_window: 0,
            yawn_count_in_window: 0,
            mouth_open_run: 0,
        }
    }

    #[test]
    fn test_condition() {
        let mut s = status();
        assert_eq!(s.condition(), DriverCondition::Awake);

        s.fatigue_asserted = true;
        assert_eq!(s.condition(), DriverCondition::Fatigued);

        s.face_detected = false;
        assert_eq!(s.condition(), DriverCondition::Undetected);
    }

    #[test]
    fn test_events_order() {
        let output = ClassifierOutput {
            fatigue_event_fired: true,
            yawn_event_fired: true,
            blink_detected: false,
            status: status(),
        };
        assert!(output.has_events());
        assert_eq!(output.events(), vec![EventKind::Fatigue, EventKind::Yawn]);
    }

    #[test]
    fn test_sign_display() {
        let sign = FatigueSign::FrequentYawning {
            yawns: 3,
            window_seconds: 60.0,
        };
        assert_eq!(sign.to_string(), "frequent yawning (3 in 60s)");
    }
}
