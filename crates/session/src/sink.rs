//! Presentation sinks (downstream collaborator seam)

use crate::SessionError;
use fatigue::{ClassifierOutput, RatioSample};

/// Renders classifier output: video overlay, live label, log, report...
pub trait PresentationSink {
    fn render(&mut self, sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError>;

    /// Called once after the source is exhausted
    fn finish(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

impl<S: PresentationSink + ?Sized> PresentationSink for &mut S {
    fn render(&mut self, sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError> {
        (**self).render(sample, output)
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        (**self).finish()
    }
}

/// Fan out to two sinks, first one first
impl<A: PresentationSink, B: PresentationSink> PresentationSink for (A, B) {
    fn render(&mut self, sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError> {
        self.0.render(sample, output)?;
        self.1.render(sample, output)
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.0.finish()?;
        self.1.finish()
    }
}

/// Collects every output (tests and offline inspection)
impl PresentationSink for Vec<ClassifierOutput> {
    fn render(&mut self, _sample: &RatioSample, output: &ClassifierOutput) -> Result<(), SessionError> {
        self.push(output.clone());
        Ok(())
    }
}
