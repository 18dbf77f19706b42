//! Batch session report
//!
//! [`ReportBuilder`] is a [`PresentationSink`] that keeps one record per
//! frame and one per fired event, then summarises them into a
//! [`SessionReport`] with a coarse risk level.

use crate::{PresentationSink, SessionError, DEFAULT_FPS};
use fatigue::{ClassifierOutput, EventKind, FatigueSign, RatioSample};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Events listed per kind in the markdown report
const MAX_LISTED_EVENTS: usize = 10;

/// Per-frame record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: u64,
    pub timestamp: f64,
    pub ear: f64,
    pub mar: f64,
    pub face_detected: bool,
    pub fatigue_asserted: bool,
    pub mouth_open: bool,
}

/// A fired event with the ratios of the frame it fired on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub kind: EventKind,
    pub frame: u64,
    pub timestamp: f64,
    pub ear: f64,
    pub mar: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signs: Vec<FatigueSign>,
}

/// Risk level from the share of frames with fatigue asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `> 30%` high, `> 10%` medium, any fatigue low
    pub fn from_fatigue_percentage(percentage: f64) -> Self {
        if percentage > 30.0 {
            Self::High
        } else if percentage > 10.0 {
            Self::Medium
        } else if percentage > 0.0 {
            Self::Low
        } else {
            Self::None
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Self::High => "frequent fatigue, rest immediately",
            Self::Medium => "signs of fatigue, consider a break",
            Self::Low => "occasional fatigue, stay alert",
            Self::None => "driver alert",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        };
        f.write_str(label)
    }
}

/// Aggregate statistics over a processed recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub total_frames: u64,
    pub fps: f64,
    pub duration_seconds: f64,
    pub detected_frames: u64,
    pub fatigue_frames: u64,
    pub fatigue_percentage: f64,
    pub yawn_frames: u64,
    pub yawn_percentage: f64,
    /// Mean over frames with a positive ratio, 0 when there are none
    pub average_ear: f64,
    pub average_mar: f64,
    pub blink_count: u64,
    pub yawn_events: u64,
    pub fatigue_events: u64,
    pub risk_level: RiskLevel,
}

/// Statistics plus the event log of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub statistics: SessionStatistics,
    pub events: Vec<EventRecord>,
}

impl SessionReport {
    /// Events of one kind in firing order
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &EventRecord> {
        self.events.iter().filter(move |event| event.kind == kind)
    }

    /// Markdown event log, at most ten entries per kind
    pub fn render_markdown(&self) -> String {
        let mut out = String::from("### Fatigue detection report\n\n");
        let fatigue: Vec<_> = self.events_of(EventKind::Fatigue).collect();
        let yawns: Vec<_> = self.events_of(EventKind::Yawn).collect();

        if fatigue.is_empty() && yawns.is_empty() {
            out.push_str("No fatigue or yawning detected.\n");
            return out;
        }

        render_event_section(&mut out, "Fatigue events", &fatigue, |e| {
            format!("{:.1}s: fatigue (EAR {:.3})", e.timestamp, e.ear)
        });
        render_event_section(&mut out, "Yawn events", &yawns, |e| {
            format!("{:.1}s: yawn (MAR {:.3})", e.timestamp, e.mar)
        });
        out
    }

    pub fn render_statistics_markdown(&self) -> String {
        let s = &self.statistics;
        format!(
            "### Overview\n\
             - **Duration**: {:.1} s\n\
             - **Frames**: {} ({} with a face)\n\
             - **Fatigue frames**: {} ({:.2}%)\n\
             - **Yawn frames**: {} ({:.2}%)\n\
             - **Events**: {} fatigue, {} yawn, {} blinks\n\n\
             ### Ratios\n\
             - **Average EAR**: {:.3}\n\
             - **Average MAR**: {:.3}\n\n\
             ### Risk\n\
             - **{}**: {}\n",
            s.duration_seconds,
            s.total_frames,
            s.detected_frames,
            s.fatigue_frames,
            s.fatigue_percentage,
            s.yawn_frames,
            s.yawn_percentage,
            s.fatigue_events,
            s.yawn_events,
            s.blink_count,
            s.average_ear,
            s.average_mar,
            s.risk_level,
            s.risk_level.advice(),
        )
    }
}

fn render_event_section<F>(out: &mut String, title: &str, events: &[&EventRecord], line: F)
where
    F: Fn(&EventRecord) -> String,
{
    if events.is_empty() {
        return;
    }
    out.push_str(&format!("#### {title}\n"));
    for event in events.iter().take(MAX_LISTED_EVENTS) {
        out.push_str(&format!("- {}\n", line(event)));
    }
    if events.len() > MAX_LISTED_EVENTS {
        out.push_str(&format!("- ... and {} more\n", events.len() - MAX_LISTED_EVENTS));
    }
    out.push('\n');
}

/// Collects frame and event records while a session runs
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    fps: f64,
    frames: Vec<FrameRecord>,
    events: Vec<EventRecord>,
    blinks: u64,
}

impl ReportBuilder {
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { DEFAULT_FPS };
        Self {
            fps,
            frames: Vec::new(),
            events: Vec::new(),
            blinks: 0,
        }
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Summarise everything recorded so far
    pub fn build(&self) -> SessionReport {
        let total = self.frames.len() as u64;
        let count = |f: fn(&FrameRecord) -> bool| self.frames.iter().filter(|r| f(r)).count() as u64;
        let fatigue_frames = count(|r| r.fatigue_asserted);
        let yawn_frames = count(|r| r.mouth_open);

        let statistics = SessionStatistics {
            total_frames: total,
            fps: self.fps,
            duration_seconds: total as f64 / self.fps,
            detected_frames: count(|r| r.face_detected),
            fatigue_frames,
            fatigue_percentage: percentage(fatigue_frames, total),
            yawn_frames,
            yawn_percentage: percentage(yawn_frames, total),
            average_ear: positive_mean(self.frames.iter().map(|r| r.ear)),
            average_mar: positive_mean(self.frames.iter().map(|r| r.mar)),
            blink_count: self.blinks,
            yawn_events: self.events.iter().filter(|e| e.kind == EventKind::Yawn).count() as u64,
            fatigue_events: self.events.iter().filter(|e| e.kind == EventKind::Fatigue).count() as u64,
            risk_level: RiskLevel::from_fatigue_percentage(percentage(fatigue_frames, total)),
        };

        SessionReport {
            statistics,
            events: self.events.clone(),
        }
    }

    /// Consume the builder
    pub fn finish_report(self) -> SessionReport {
        self.build()
    }
}

impl PresentationSink for ReportBuilder {
    fn render(&mut self, sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError> {
        let frame = self.frames.len() as u64;
        let status = &output.status;

        self.frames.push(FrameRecord {
            frame,
            timestamp: sample.timestamp,
            ear: sample.ear,
            mar: sample.mar,
            face_detected: status.face_detected,
            fatigue_asserted: status.fatigue_asserted,
            mouth_open: status.mouth_open(),
        });

        if output.blink_detected {
            self.blinks += 1;
        }
        for kind in output.events() {
            let signs = match kind {
                EventKind::Fatigue => status.fatigue_signs.clone(),
                EventKind::Yawn => Vec::new(),
            };
            self.events.push(EventRecord {
                kind,
                frame,
                timestamp: sample.timestamp,
                ear: sample.ear,
                mar: sample.mar,
                signs,
            });
        }
        Ok(())
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn positive_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .filter(|v| *v > 0.0)
        .fold((0.0, 0u64), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
