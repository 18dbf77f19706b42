//! Prometheus counters

use fatigue::{ClassifierOutput, RatioSample};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use session::{PresentationSink, SessionError};

pub const FRAMES_PROCESSED: &str = "fatigue_frames_processed_total";
pub const FRAMES_UNDETECTED: &str = "fatigue_frames_undetected_total";
pub const EVENTS: &str = "fatigue_events_total";
pub const SESSIONS: &str = "fatigue_sessions_total";

/// Install the global recorder; the handle renders `/metrics`
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Session sink that feeds the process-wide counters
#[derive(Debug, Default)]
pub struct MetricsSink;

impl PresentationSink for MetricsSink {
    fn render(&mut self, _sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError> {
        counter!(FRAMES_PROCESSED).increment(1);
        if !output.status.face_detected {
            counter!(FRAMES_UNDETECTED).increment(1);
        }
        for kind in output.events() {
            counter!(EVENTS, "kind" => kind.as_str()).increment(1);
        }
        if output.blink_detected {
            counter!(EVENTS, "kind" => "blink").increment(1);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        counter!(SESSIONS).increment(1);
        Ok(())
    }
}
