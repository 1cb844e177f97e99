//! Continuous live-microphone monitoring.
//!
//! Live mode degenerates the pipeline to one-frame segmentation: each
//! captured frame goes straight through the estimator and the note mapper,
//! with none of the windowed smoothing stages (those need complete,
//! ordered context that a live stream cannot provide).

use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::error::AnalysisError;
use crate::note;
use crate::pitch::PitchEstimator;
use crate::{audio, config::AnalysisConfig};

/// One live reading: the detected frequency (0 when the frame carried no
/// pitch) and its note label.
#[derive(Debug, Clone)]
pub struct LiveReading {
    pub frequency_hz: f32,
    pub note: Option<String>,
}

/// A running live-monitoring session.
///
/// Holds the capture stream; dropping the session stops the microphone.
pub struct LiveSession {
    _stream: cpal::Stream,
    frames: Receiver<Vec<f32>>,
    sample_rate: u32,
    estimator: Box<dyn PitchEstimator>,
}

impl LiveSession {
    /// Opens the default input device and starts streaming frames.
    ///
    /// Fails with [`AnalysisError::DeviceAccess`] when no usable device is
    /// available; that is fatal to live mode only.
    pub fn start(
        config: &AnalysisConfig,
        estimator: Box<dyn PitchEstimator>,
    ) -> Result<Self, AnalysisError> {
        let (sender, frames) = crossbeam_channel::bounded(8);
        let (stream, sample_rate) = audio::start_capture(sender, config.frame_size)?;
        Ok(Self {
            _stream: stream,
            frames,
            sample_rate,
            estimator,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Waits up to `timeout` for the next captured frame and analyzes it.
    ///
    /// `None` means no frame arrived in time. A frame without detectable
    /// pitch yields a reading with the 0 sentinel and no note.
    pub fn next_reading(&self, timeout: Duration) -> Option<LiveReading> {
        let frame = self.frames.recv_timeout(timeout).ok()?;
        let frequency = self
            .estimator
            .detect(&frame, self.sample_rate)
            .unwrap_or(0.0);
        Some(LiveReading {
            frequency_hz: frequency,
            note: note::note_label(frequency),
        })
    }
}
