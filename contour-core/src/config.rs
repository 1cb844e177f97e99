//! Configuration parameters for the analysis pipeline.

/// Tuning knobs for [`analyze`](crate::analyze).
///
/// The defaults are the values the pipeline was tuned with: 2048-sample
/// frames, a noise floor taken from sparse-sampled peak amplitude, a
/// 100-frame median window and a 12-frame gap limit.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Samples per analysis frame (default: 2048).
    pub frame_size: usize,

    /// Cutoff of the optional low-pass pre-filter applied to the analysis
    /// copy of the signal, never to the audible buffer (default: 5000 Hz).
    /// `None` disables the pre-filter.
    pub lowpass_cutoff_hz: Option<f32>,

    /// Estimator outputs above this frequency are discarded outright
    /// (default: 5000 Hz). Applies in addition to the pre-filter.
    pub max_frequency_hz: f32,

    /// Stride, in sample indices, of the sparse peak-amplitude scan that
    /// derives the noise floor (default: 1000).
    pub noise_floor_stride: usize,

    /// Fraction of the sparse-sampled peak amplitude used as the noise
    /// floor (default: 0.08).
    pub noise_floor_factor: f32,

    /// Detections above this frequency with frame RMS below the noise
    /// floor are suppressed as likely noise bursts (default: 1500 Hz).
    pub gate_frequency_hz: f32,

    /// Width of the centered median window used for outlier rejection
    /// (default: 100 frames).
    pub outlier_window: usize,

    /// Longest run of undetected frames that is backfilled with the last
    /// valid frequency; longer runs are treated as true silence
    /// (default: 12 frames).
    pub max_gap_frames: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            lowpass_cutoff_hz: Some(5000.0),
            max_frequency_hz: 5000.0,
            noise_floor_stride: 1000,
            noise_floor_factor: 0.08,
            gate_frequency_hz: 1500.0,
            outlier_window: 100,
            max_gap_frames: 12,
        }
    }
}
