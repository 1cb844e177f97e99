//! The pitch contour and its summary statistics.

use serde::Serialize;

use crate::error::AnalysisError;

/// One per-frame measurement in the contour.
///
/// `frequency_hz` uses 0 as the "no pitch" sentinel and is the only field
/// the smoothing stages may overwrite; the timestamp and RMS are fixed at
/// creation.
#[derive(Debug, Clone, Serialize)]
pub struct FrameMeasurement {
    /// Start time of the frame in seconds.
    pub timestamp_secs: f32,
    /// Detected fundamental frequency in Hz; 0 means no pitch.
    pub frequency_hz: f32,
    /// Root-mean-square amplitude of the frame.
    pub rms: f32,
}

impl FrameMeasurement {
    /// Whether this frame carries a detected pitch.
    pub fn has_pitch(&self) -> bool {
        self.frequency_hz > 0.0
    }
}

/// Summary statistics over the contour's pitched frames, rounded to 0.1 Hz.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContourSummary {
    pub min_hz: f32,
    pub max_hz: f32,
    pub avg_hz: f32,
}

/// The final analysis result: a time-ascending measurement sequence plus
/// summary statistics. Exists for the life of one loaded buffer.
#[derive(Debug, Clone, Serialize)]
pub struct PitchContour {
    pub measurements: Vec<FrameMeasurement>,
    pub summary: ContourSummary,
    /// Duration of the source buffer in seconds.
    pub duration_secs: f64,
}

impl PitchContour {
    /// Assembles the contour from smoothed measurements.
    ///
    /// Returns [`AnalysisError::NoPitchDetected`] when not a single frame
    /// carries a usable frequency; the summary is undefined in that case
    /// and is never silently zeroed.
    pub fn from_measurements(
        measurements: Vec<FrameMeasurement>,
        duration_secs: f64,
    ) -> Result<Self, AnalysisError> {
        let pitched: Vec<f32> = measurements
            .iter()
            .filter(|m| m.has_pitch())
            .map(|m| m.frequency_hz)
            .collect();
        if pitched.is_empty() {
            return Err(AnalysisError::NoPitchDetected);
        }

        let min = pitched.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = pitched.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let avg = pitched.iter().sum::<f32>() / pitched.len() as f32;

        Ok(Self {
            measurements,
            summary: ContourSummary {
                min_hz: round_tenth(min),
                max_hz: round_tenth(max),
                avg_hz: round_tenth(avg),
            },
            duration_secs,
        })
    }

    /// Number of frames carrying a detected pitch.
    pub fn pitched_frames(&self) -> usize {
        self.measurements.iter().filter(|m| m.has_pitch()).count()
    }
}

fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(t: f32, hz: f32) -> FrameMeasurement {
        FrameMeasurement {
            timestamp_secs: t,
            frequency_hz: hz,
            rms: 0.5,
        }
    }

    #[test]
    fn all_zero_frequencies_is_no_pitch_detected() {
        let ms = vec![measurement(0.0, 0.0), measurement(0.05, 0.0)];
        let err = PitchContour::from_measurements(ms, 0.1).unwrap_err();
        assert!(matches!(err, AnalysisError::NoPitchDetected));
    }

    #[test]
    fn summary_ignores_unpitched_frames() {
        let ms = vec![
            measurement(0.0, 0.0),
            measurement(0.05, 100.0),
            measurement(0.10, 300.0),
            measurement(0.15, 0.0),
        ];
        let contour = PitchContour::from_measurements(ms, 0.2).unwrap();
        assert_eq!(contour.summary.min_hz, 100.0);
        assert_eq!(contour.summary.max_hz, 300.0);
        assert_eq!(contour.summary.avg_hz, 200.0);
        assert_eq!(contour.pitched_frames(), 2);
    }

    #[test]
    fn summary_is_rounded_to_one_decimal() {
        let ms = vec![measurement(0.0, 261.6256)];
        let contour = PitchContour::from_measurements(ms, 0.05).unwrap();
        assert_eq!(contour.summary.avg_hz, 261.6);
    }
}
