//! Console presentation

use alerting::{status_key, status_line, AlertManager, EarBand};
use chrono::Local;
use fatigue::{ClassifierOutput, DriverCondition, RatioSample};
use session::{PresentationSink, SessionError};
use std::io::Write;

/// Timestamped alert log plus the status label whenever it changes
pub struct ConsoleSink<W> {
    writer: W,
    alerts: AlertManager,
    last_status: Option<(DriverCondition, Option<EarBand>)>,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W, alerts: AlertManager) -> Self {
        Self {
            writer,
            alerts,
            last_status: None,
        }
    }

    fn log(&mut self, message: &str) -> Result<(), SessionError> {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.writer, "[{now}] {message}")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PresentationSink for ConsoleSink<W> {
    fn render(&mut self, _sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError> {
        for alert in self.alerts.observe(output) {
            self.log(&alert.message)?;
        }

        let key = status_key(&output.status);
        if self.last_status != Some(key) {
            writeln!(self.writer, "    {}", status_line(&output.status))?;
            self.last_status = Some(key);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One JSON `ClassifierOutput` per line
pub struct JsonSink<W> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> PresentationSink for JsonSink<W> {
    fn render(&mut self, _sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError> {
        serde_json::to_writer(&mut self.writer, output).map_err(|e| SessionError::Sink(e.to_string()))?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.writer.flush()?;
        Ok(())
    }
}
