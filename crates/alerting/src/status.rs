//! Status label

use crate::Severity;
use fatigue::{DisplayStatus, DriverCondition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse band of the averaged EAR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarBand {
    /// Above 0.30
    Normal,
    /// Between the tired threshold and 0.30
    Borderline,
    /// At or below 0.27
    Tired,
    /// At or below 0.25
    VeryTired,
    /// At or below 0.20
    Closed,
}

impl EarBand {
    pub fn classify(ear: f64) -> Self {
        if ear <= 0.20 {
            Self::Closed
        } else if ear <= 0.25 {
            Self::VeryTired
        } else if ear <= 0.27 {
            Self::Tired
        } else if ear <= 0.30 {
            Self::Borderline
        } else {
            Self::Normal
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Normal | Self::Borderline => Severity::Info,
            Self::Tired => Severity::Medium,
            Self::VeryTired => Severity::High,
            Self::Closed => Severity::Critical,
        }
    }
}

impl fmt::Display for EarBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "normal",
            Self::Borderline => "borderline",
            Self::Tired => "tired",
            Self::VeryTired => "very tired",
            Self::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Live status label for one frame
pub fn status_line(status: &DisplayStatus) -> String {
    match status.condition() {
        DriverCondition::Undetected => "Face not detected".to_string(),
        DriverCondition::Fatigued => {
            let signs: Vec<String> = status.fatigue_signs.iter().map(ToString::to_string).collect();
            format!(
                "WARNING: fatigue detected | {} | please take a rest",
                signs.join("; ")
            )
        }
        DriverCondition::Awake => match status.averaged_ear {
            Some(ear) => format!("Awake | EAR {:.3} ({})", ear, EarBand::classify(ear)),
            None => "Awake".to_string(),
        },
    }
}

/// What the status label shows, without the per-frame numbers.
/// The EAR band only counts while awake.
pub fn status_key(status: &DisplayStatus) -> (DriverCondition, Option<EarBand>) {
    let condition = status.condition();
    let band = match condition {
        DriverCondition::Awake => status.averaged_ear.map(EarBand::classify),
        _ => None,
    };
    (condition, band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatigue::{EyeState, FatigueSign};

    fn status() -> DisplayStatus {
        DisplayStatus {
            timestamp: 0.0,
            face_detected: true,
            current_ear: 0.31,
            averaged_ear: Some(0.31),
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
    fn test_ear_bands() {
        assert_eq!(EarBand::classify(0.35), EarBand::Normal);
        assert_eq!(EarBand::classify(0.29), EarBand::Borderline);
        assert_eq!(EarBand::classify(0.27), EarBand::Tired);
        assert_eq!(EarBand::classify(0.25), EarBand::VeryTired);
        assert_eq!(EarBand::classify(0.20), EarBand::Closed);
        assert_eq!(EarBand::classify(0.20).severity(), Severity::Critical);
    }

    #[test]
    fn test_awake_line() {
        assert_eq!(status_line(&status()), "Awake | EAR 0.310 (normal)");
    }

    #[test]
    fn test_fatigue_line_lists_signs() {
        let mut s = status();
        s.fatigue_asserted = true;
        s.fatigue_signs = vec![
            FatigueSign::SustainedEyeClosure { closed_frames: 8 },
            FatigueSign::FrequentYawning {
                yawns: 3,
                window_seconds: 60.0,
            },
        ];
        let line = status_line(&s);
        assert!(line.starts_with("WARNING"));
        assert!(line.contains("sustained eye closure (8 frames); frequent yawning (3 in 60s)"));
    }

    #[test]
    fn test_status_key_ignores_ear_noise() {
        let mut a = status();
        let mut b = status();
        a.averaged_ear = Some(0.33);
        b.averaged_ear = Some(0.34);
        assert_ne!(status_line(&a), status_line(&b));
        assert_eq!(status_key(&a), status_key(&b));
        assert_eq!(status_key(&a), (DriverCondition::Awake, Some(EarBand::Normal)));

        b.averaged_ear = Some(0.26);
        assert_eq!(status_key(&b), (DriverCondition::Awake, Some(EarBand::Tired)));
    }

    #[test]
    fn test_status_key_fatigue_ignores_band() {
        let mut s = status();
        s.fatigue_asserted = true;
        s.fatigue_signs = vec![FatigueSign::SustainedEyeClosure { closed_frames: 8 }];
        s.averaged_ear = Some(0.15);
        assert_eq!(status_key(&s), (DriverCondition::Fatigued, None));
    }

    #[test]
    fn test_undetected_line() {
        let mut s = status();
        s.face_detected = false;
        assert_eq!(status_line(&s), "Face not detected");
    }
}
