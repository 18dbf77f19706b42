//! Alert Manager Implementation

use crate::{AlertError, Severity};
use fatigue::{ClassifierOutput, DisplayStatus};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::{debug, info, warn};

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum spacing between face lost/found alerts (seconds, sample time)
    pub cooldown_seconds: f64,
    /// Repeat the face-lost alert at this interval while no face is seen.
    /// Zero disables the reminder.
    pub undetected_log_interval_seconds: f64,
    /// Alerts kept in history
    pub max_history: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 3.0,
            undetected_log_interval_seconds: 3.0,
            max_history: 500,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), AlertError> {
        if !self.cooldown_seconds.is_finite() || self.cooldown_seconds < 0.0 {
            return Err(AlertError::Config(format!(
                "cooldown_seconds must be non-negative, got {}",
                self.cooldown_seconds
            )));
        }
        if !self.undetected_log_interval_seconds.is_finite()
            || self.undetected_log_interval_seconds < 0.0
        {
            return Err(AlertError::Config(format!(
                "undetected_log_interval_seconds must be non-negative, got {}",
                self.undetected_log_interval_seconds
            )));
        }
        if self.max_history == 0 {
            return Err(AlertError::Config("max_history must be at least 1".into()));
        }
        Ok(())
    }
}

/// What an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Fatigue,
    Yawn,
    Blink,
    FaceLost,
    FaceFound,
}

impl AlertKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Fatigue => Severity::High,
            Self::Yawn => Severity::Medium,
            Self::FaceLost => Severity::Low,
            Self::Blink | Self::FaceFound => Severity::Info,
        }
    }

    /// Kinds derived from face presence, subject to cooldown
    fn is_presence(&self) -> bool {
        matches!(self, Self::FaceLost | Self::FaceFound)
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fatigue => "fatigue",
            Self::Yawn => "yawn",
            Self::Blink => "blink",
            Self::FaceLost => "face_lost",
            Self::FaceFound => "face_found",
        };
        f.write_str(name)
    }
}

/// A log-worthy alert, timestamped with sample time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub timestamp: f64,
    pub severity: Severity,
    pub message: String,
}

/// State of an alert kind
#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    /// Sample time this kind last fired
    pub last_fired: f64,
    /// Number of times fired
    pub fire_count: usize,
    /// Whether alert is acknowledged
    pub acknowledged: bool,
}

/// Turns classifier outputs into alerts and keeps a bounded history
pub struct AlertManager {
    config: AlertConfig,
    states: HashMap<AlertKind, AlertState>,
    history: VecDeque<Alert>,
    /// Face presence on the previous frame, `None` before the first frame
    face_present: Option<bool>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Result<Self, AlertError> {
        config.validate()?;
        info!("Creating alert manager with config: {:?}", config);
        Ok(Self {
            config,
            states: HashMap::new(),
            history: VecDeque::new(),
            face_present: None,
        })
    }

    /// Alerts for one classifier output, in firing order
    pub fn observe(&mut self, output: &ClassifierOutput) -> Vec<Alert> {
        let status = &output.status;
        let now = status.timestamp;
        let mut alerts = Vec::new();

        match (self.face_present, status.face_detected) {
            (Some(true) | None, false) => {
                self.push_if_allowed(&mut alerts, AlertKind::FaceLost, now, status)
            }
            (Some(false), false) => {
                let interval = self.config.undetected_log_interval_seconds;
                let due = interval > 0.0
                    && self
                        .states
                        .get(&AlertKind::FaceLost)
                        .map_or(true, |s| now - s.last_fired >= interval);
                if due {
                    self.push_if_allowed(&mut alerts, AlertKind::FaceLost, now, status);
                }
            }
            (Some(false), true) => {
                self.push_if_allowed(&mut alerts, AlertKind::FaceFound, now, status)
            }
            _ => {}
        }
        self.face_present = Some(status.face_detected);

        // Classifier events are already rate limited upstream
        if output.fatigue_event_fired {
            alerts.push(self.fire(AlertKind::Fatigue, now, status));
        }
        if output.yawn_event_fired {
            alerts.push(self.fire(AlertKind::Yawn, now, status));
        }
        if output.blink_detected {
            alerts.push(self.fire(AlertKind::Blink, now, status));
        }
        alerts
    }

    fn push_if_allowed(
        &mut self,
        alerts: &mut Vec<Alert>,
        kind: AlertKind,
        now: f64,
        status: &DisplayStatus,
    ) {
        if self.should_fire(kind, now) {
            alerts.push(self.fire(kind, now, status));
        }
    }

    /// Check the per-kind cooldown; only presence alerts are throttled
    pub fn should_fire(&self, kind: AlertKind, now: f64) -> bool {
        if !kind.is_presence() {
            return true;
        }
        match self.states.get(&kind) {
            Some(state) if now - state.last_fired < self.config.cooldown_seconds => {
                debug!(%kind, "Alert suppressed: in cooldown period");
                false
            }
            _ => true,
        }
    }

    fn fire(&mut self, kind: AlertKind, now: f64, status: &DisplayStatus) -> Alert {
        self.record_fire(kind, now);
        let alert = Alert {
            kind,
            timestamp: now,
            severity: kind.severity(),
            message: alert_message(kind, status),
        };

        match alert.severity {
            Severity::High | Severity::Critical => warn!(%kind, "{}", alert.message),
            Severity::Info => debug!(%kind, "{}", alert.message),
            _ => info!(%kind, "{}", alert.message),
        }

        if self.history.len() == self.config.max_history {
            self.history.pop_front();
        }
        self.history.push_back(alert.clone());
        alert
    }

    /// Record that an alert was fired
    pub fn record_fire(&mut self, kind: AlertKind, now: f64) {
        let state = self.states.entry(kind).or_insert(AlertState {
            last_fired: now,
            fire_count: 0,
            acknowledged: false,
        });
        state.last_fired = now;
        state.fire_count += 1;
        state.acknowledged = false;
    }

    /// Acknowledge an alert kind
    pub fn acknowledge(&mut self, kind: AlertKind) -> bool {
        if let Some(state) = self.states.get_mut(&kind) {
            state.acknowledged = true;
            info!("Alert acknowledged: {}", kind);
            true
        } else {
            false
        }
    }

    /// Get pending (unacknowledged) alert kinds
    pub fn pending(&self) -> Vec<(AlertKind, &AlertState)> {
        self.states
            .iter()
            .filter(|(_, state)| !state.acknowledged)
            .map(|(k, v)| (*k, v))
            .collect()
    }

    pub fn state(&self, kind: AlertKind) -> Option<&AlertState> {
        self.states.get(&kind)
    }

    /// Most recent alerts, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Alert> {
        self.history.iter()
    }

    /// Clear all alert states
    pub fn clear(&mut self) {
        self.states.clear();
        self.history.clear();
        self.face_present = None;
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self {
            config: AlertConfig::default(),
            states: HashMap::new(),
            history: VecDeque::new(),
            face_present: None,
        }
    }
}

fn alert_message(kind: AlertKind, status: &DisplayStatus) -> String {
    match kind {
        AlertKind::Fatigue => {
            let signs: Vec<String> = status.fatigue_signs.iter().map(ToString::to_string).collect();
            match status.averaged_ear {
                Some(ear) => format!("Fatigue detected: {} (EAR {:.3})", signs.join(", "), ear),
                None => format!("Fatigue detected: {}", signs.join(", ")),
            }
        }
        AlertKind::Yawn => format!("Yawn detected (MAR {:.3})", status.current_mar),
        AlertKind::Blink => format!("Blink ({} in window)", status.blink_count_in_window),
        AlertKind::FaceLost => "Face not detected".to_string(),
        AlertKind::FaceFound => "Face detected".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatigue::{EyeState, FatigueSign};

    fn output(timestamp: f64, face: bool) -> ClassifierOutput {
        ClassifierOutput {
            fatigue_event_fired: false,
            yawn_event_fired: false,
            blink_detected: false,
            status: DisplayStatus {
                timestamp,
                face_detected: face,
                current_ear: if face { 0.3 } else { 0.0 },
                averaged_ear: face.then_some(0.3),
                current_mar: 0.2,
                eye_state: EyeState::Open,
                fatigue_asserted: false,
                fatigue_signs: Vec::new(),
                blink_count_in_window: 0,
                yawn_count_in_window: 0,
                mouth_open_run: 0,
            },
        }
    }

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_classifier_events_become_alerts() {
        let mut manager = AlertManager::default();
        let mut out = output(1.0, true);
        out.fatigue_event_fired = true;
        out.yawn_event_fired = true;
        out.status.fatigue_asserted = true;
        out.status.fatigue_signs = vec![FatigueSign::SustainedEyeClosure { closed_frames: 9 }];

        let alerts = manager.observe(&out);
        assert_eq!(kinds(&alerts), vec![AlertKind::Fatigue, AlertKind::Yawn]);
        assert_eq!(alerts[0].severity, Severity::High);
        assert!(alerts[0].message.contains("sustained eye closure (9 frames)"));
    }

    #[test]
    fn test_events_are_never_throttled() {
        let mut manager = AlertManager::default();
        for t in [1.0, 1.1, 1.2] {
            let mut out = output(t, true);
            out.yawn_event_fired = true;
            assert_eq!(manager.observe(&out).len(), 1);
        }
        assert_eq!(manager.state(AlertKind::Yawn).unwrap().fire_count, 3);
    }

    #[test]
    fn test_face_lost_and_found() {
        let mut manager = AlertManager::default();
        assert!(manager.observe(&output(0.0, true)).is_empty());
        assert_eq!(kinds(&manager.observe(&output(0.1, false))), vec![AlertKind::FaceLost]);
        assert!(manager.observe(&output(0.2, false)).is_empty());
        assert_eq!(kinds(&manager.observe(&output(0.3, true))), vec![AlertKind::FaceFound]);
    }

    #[test]
    fn test_face_lost_reminder_interval() {
        let mut manager = AlertManager::default();
        assert_eq!(manager.observe(&output(0.0, false)).len(), 1);
        assert!(manager.observe(&output(2.9, false)).is_empty());
        assert_eq!(kinds(&manager.observe(&output(3.0, false))), vec![AlertKind::FaceLost]);
    }

    #[test]
    fn test_flicker_is_throttled() {
        let mut manager = AlertManager::default();
        manager.observe(&output(0.0, true));
        assert_eq!(manager.observe(&output(0.1, false)).len(), 1);
        assert_eq!(manager.observe(&output(0.2, true)).len(), 1);
        // Second loss inside the cooldown
        assert!(manager.observe(&output(0.3, false)).is_empty());
        assert!(manager.observe(&output(0.4, true)).is_empty());
        assert_eq!(manager.observe(&output(3.5, false)).len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = AlertConfig {
            max_history: 2,
            ..Default::default()
        };
        let mut manager = AlertManager::new(config).unwrap();
        for t in 0..5 {
            let mut out = output(t as f64, true);
            out.blink_detected = true;
            manager.observe(&out);
        }
        let history: Vec<f64> = manager.history().map(|a| a.timestamp).collect();
        assert_eq!(history, vec![3.0, 4.0]);
    }

    #[test]
    fn test_acknowledgement() {
        let mut manager = AlertManager::default();
        manager.record_fire(AlertKind::Fatigue, 1.0);

        assert_eq!(manager.pending().len(), 1);
        assert!(manager.acknowledge(AlertKind::Fatigue));
        assert!(manager.pending().is_empty());
        assert!(!manager.acknowledge(AlertKind::Yawn));
    }

    #[test]
    fn test_invalid_config() {
        let config = AlertConfig {
            cooldown_seconds: -1.0,
            ..Default::default()
        };
        assert!(matches!(AlertManager::new(config), Err(AlertError::Config(_))));
    }
}
