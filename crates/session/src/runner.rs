//! Session loop

use crate::{PresentationSink, RatioSource, SessionError};
use fatigue::{ClassifierOutput, FatigueClassifier, FatigueConfig, RatioSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Frames between progress log lines
pub const PROGRESS_INTERVAL: u64 = 30;

/// Counters accumulated over one `run`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub undetected_frames: u64,
    pub fatigue_frames: u64,
    pub blinks: u64,
    pub yawn_events: u64,
    pub fatigue_events: u64,
    pub first_timestamp: Option<f64>,
    pub last_timestamp: Option<f64>,
}

impl SessionSummary {
    fn record(&mut self, sample: &RatioSample, output: &ClassifierOutput) {
        self.frames += 1;
        self.first_timestamp.get_or_insert(sample.timestamp);
        self.last_timestamp = Some(sample.timestamp);

        if !output.status.face_detected {
            self.undetected_frames += 1;
        }
        if output.status.fatigue_asserted {
            self.fatigue_frames += 1;
        }
        self.blinks += output.blink_detected as u64;
        self.yawn_events += output.yawn_event_fired as u64;
        self.fatigue_events += output.fatigue_event_fired as u64;
    }

    /// Seconds between the first and last processed sample
    pub fn elapsed_seconds(&self) -> f64 {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// One monitoring session: a classifier plus the loop that feeds it
pub struct Session {
    classifier: FatigueClassifier,
}

impl Session {
    /// Open a session; invalid configuration is fatal here
    pub fn new(config: FatigueConfig) -> Result<Self, SessionError> {
        Ok(Self {
            classifier: FatigueClassifier::new(config)?,
        })
    }

    /// Classify a single sample
    pub fn process(&mut self, sample: &RatioSample) -> Result<ClassifierOutput, SessionError> {
        Ok(self.classifier.update_sample(sample)?)
    }

    /// For each available sample: classify, then render
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<SessionSummary, SessionError>
    where
        S: RatioSource + ?Sized,
        K: PresentationSink + ?Sized,
    {
        let mut summary = SessionSummary::default();
        info!("Session started");

        while let Some(sample) = source.next_sample()? {
            let output = self.process(&sample)?;
            summary.record(&sample, &output);
            sink.render(&sample, &output)?;

            if summary.frames % PROGRESS_INTERVAL == 0 {
                debug!(
                    frames = summary.frames,
                    timestamp = sample.timestamp,
                    "Session progress"
                );
            }
        }
        sink.finish()?;

        info!(
            frames = summary.frames,
            undetected = summary.undetected_frames,
            blinks = summary.blinks,
            yawns = summary.yawn_events,
            fatigue_events = summary.fatigue_events,
            "Session finished"
        );
        Ok(summary)
    }

    /// User-triggered clear; the next sample may restart the clock
    pub fn reset(&mut self) {
        self.classifier.reset();
    }

    pub fn classifier(&self) -> &FatigueClassifier {
        &self.classifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameSequence;

    #[test]
    fn test_run_collects_summary() {
        let mut frames = vec![(0.3, 0.1); 5];
        frames.extend([(0.2, 0.1); 20]);
        frames.extend([(0.0, 0.0); 3]);
        let mut source = FrameSequence::new(30.0, frames);
        let mut outputs: Vec<ClassifierOutput> = Vec::new();

        let mut session = Session::new(FatigueConfig::default()).unwrap();
        let summary = session.run(&mut source, &mut outputs).unwrap();

        assert_eq!(summary.frames, 28);
        assert_eq!(outputs.len(), 28);
        assert_eq!(summary.undetected_frames, 3);
        assert_eq!(summary.fatigue_events, 1);
        assert!(summary.fatigue_frames > 0);
        assert!((summary.elapsed_seconds() - 27.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_independent_sessions_do_not_share_state() {
        let closed = vec![(0.2, 0.1); 20];
        let open = vec![(0.32, 0.1); 20];

        let mut a = Session::new(FatigueConfig::default()).unwrap();
        let mut b = Session::new(FatigueConfig::default()).unwrap();
        let sa = a.run(&mut FrameSequence::new(30.0, closed), &mut Vec::new()).unwrap();
        let sb = b.run(&mut FrameSequence::new(30.0, open), &mut Vec::new()).unwrap();

        assert_eq!(sa.fatigue_events, 1);
        assert_eq!(sb.fatigue_events, 0);
    }

    #[test]
    fn test_non_monotonic_source_aborts() {
        struct Backwards(Vec<f64>);
        impl RatioSource for Backwards {
            fn next_sample(&mut self) -> Result<Option<RatioSample>, SessionError> {
                Ok(self.0.pop().map(|t| RatioSample::new(t, 0.3, 0.1)))
            }
        }

        let mut session = Session::new(FatigueConfig::default()).unwrap();
        let result = session.run(&mut Backwards(vec![0.0, 1.0]), &mut Vec::new());
        assert!(matches!(result, Err(SessionError::Classifier(_))));
    }

    #[test]
    fn test_invalid_config_fails_session_start() {
        let config = FatigueConfig {
            ear_history_length: 0,
            ..Default::default()
        };
        assert!(Session::new(config).is_err());
    }
}
