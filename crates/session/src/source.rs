//! Ratio sources (upstream collaborator seam)

use crate::SessionError;
use fatigue::{FaceLandmarks, RatioSample};
use std::io::BufRead;
use tracing::warn;

/// Frame rate assumed when a recording does not report one
pub const DEFAULT_FPS: f64 = 30.0;

/// Produces one ratio sample per processed frame.
///
/// `Ok(None)` ends the session. A frame without a usable face is a sample
/// with `ear == 0.0`, not an error.
pub trait RatioSource {
    fn next_sample(&mut self) -> Result<Option<RatioSample>, SessionError>;
}

/// Pre-computed `(ear, mar)` pairs of a recording, timestamped `index / fps`
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<(f64, f64)>,
    fps: f64,
    position: usize,
}

impl FrameSequence {
    /// Create a sequence. A missing or non-positive fps falls back to 30.
    pub fn new(fps: f64, frames: Vec<(f64, f64)>) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            warn!("Invalid frame rate {}, assuming {}", fps, DEFAULT_FPS);
            DEFAULT_FPS
        };
        Self {
            frames,
            fps,
            position: 0,
        }
    }

    /// Build from per-frame landmarks; `None` is a frame without a face
    pub fn from_landmarks(fps: f64, frames: &[Option<FaceLandmarks>]) -> Self {
        let ratios = frames
            .iter()
            .map(|face| face.as_ref().map_or((0.0, 0.0), FaceLandmarks::ratios))
            .collect();
        Self::new(fps, ratios)
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl RatioSource for FrameSequence {
    fn next_sample(&mut self) -> Result<Option<RatioSample>, SessionError> {
        let Some(&(ear, mar)) = self.frames.get(self.position) else {
            return Ok(None);
        };
        let timestamp = self.position as f64 / self.fps;
        self.position += 1;
        Ok(Some(RatioSample::new(timestamp, ear, mar)))
    }
}

/// One JSON `RatioSample` per line; blank lines are skipped
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> RatioSource for JsonLinesSource<R> {
    fn next_sample(&mut self) -> Result<Option<RatioSample>, SessionError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            return serde_json::from_str(text)
                .map(Some)
                .map_err(|source| SessionError::Parse {
                    line: self.line,
                    source,
                });
        }
    }
}
