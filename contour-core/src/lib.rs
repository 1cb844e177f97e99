// contour-core/src/lib.rs

//! The core logic for the pitch-contour analyzer.
//! This crate extracts a fundamental-frequency contour from a decoded
//! recording, cleans it up into a musically usable signal, and keeps a
//! playback cursor synchronized to audio time. It is completely headless
//! and contains no UI code.
//!
//! The analysis pipeline is a single synchronous pass per loaded buffer:
//!
//! ```text
//! samples → low-pass (analysis copy) → frames → pitch estimation
//!         → energy gate → outlier rejection → gap filling → contour
//! ```
//!
//! Note mapping and the playback cursor consume the contour on demand
//! from whatever rendering loop the front end runs.

pub mod audio;
pub mod config;
pub mod contour;
pub mod decode;
pub mod error;
pub mod frame;
pub mod live;
pub mod lowpass;
pub mod note;
pub mod pitch;
pub mod playback;
pub mod smoothing;
pub mod spectrum;
pub mod store;

use std::borrow::Cow;

use rayon::prelude::*;

pub use config::AnalysisConfig;
pub use contour::{ContourSummary, FrameMeasurement, PitchContour};
pub use error::AnalysisError;
pub use pitch::{PitchEstimator, YinEstimator};
pub use playback::{PlaybackCursor, PlaybackState, SystemClock};

/// Analyzes a decoded buffer with the default YIN estimator.
///
/// See [`analyze_with`] for the pipeline description.
pub fn analyze(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<PitchContour, AnalysisError> {
    analyze_with(samples, sample_rate, config, &YinEstimator::default())
}

/// Analyzes a decoded buffer with a caller-supplied estimator.
///
/// Segments the signal into frames, estimates a pitch per frame (frames
/// fan out across worker threads and are reassembled in order before the
/// windowed stages run), then gates, smooths and gap-fills the raw
/// estimates into a [`PitchContour`].
///
/// The low-pass pre-filter, when enabled, applies only to the analysis
/// copy; callers keep the original buffer for audible playback.
///
/// # Errors
///
/// [`AnalysisError::NoPitchDetected`] when no frame yields a usable
/// frequency — a terminal outcome the caller must surface instead of
/// proceeding to note mapping.
pub fn analyze_with(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
    estimator: &dyn PitchEstimator,
) -> Result<PitchContour, AnalysisError> {
    let analysis_signal: Cow<[f32]> = match config.lowpass_cutoff_hz {
        Some(cutoff) => Cow::Owned(lowpass::apply_low_pass(samples, sample_rate, cutoff)),
        None => Cow::Borrowed(samples),
    };

    let threshold = smoothing::noise_floor(
        &analysis_signal,
        config.noise_floor_stride,
        config.noise_floor_factor,
    );

    let frames: Vec<frame::Frame> =
        frame::FrameSegmenter::new(&analysis_signal, sample_rate, config.frame_size).collect();
    log::debug!(
        "analyzing {} frames of {} samples (noise floor {:.4})",
        frames.len(),
        config.frame_size,
        threshold
    );

    let mut measurements: Vec<FrameMeasurement> = frames
        .par_iter()
        .map(|f| {
            let frequency = estimator
                .detect(f.samples, sample_rate)
                // The ceiling applies even when the analysis copy is
                // already low-pass filtered at the same cutoff; both
                // guards stay in place.
                .filter(|&hz| hz <= config.max_frequency_hz)
                .unwrap_or(0.0);
            FrameMeasurement {
                timestamp_secs: f.timestamp_secs,
                frequency_hz: frequency,
                rms: f.rms(),
            }
        })
        .collect();

    smoothing::gate_high_frequency_noise(&mut measurements, threshold, config.gate_frequency_hz);
    smoothing::reject_outliers(&mut measurements, config.outlier_window);
    smoothing::fill_short_gaps(&mut measurements, config.max_gap_frames);

    let duration_secs = samples.len() as f64 / sample_rate as f64;
    let contour = PitchContour::from_measurements(measurements, duration_secs)?;
    log::info!(
        "contour: {} frames ({} pitched), {:.1}-{:.1} Hz, avg {:.1} Hz",
        contour.measurements.len(),
        contour.pitched_frames(),
        contour.summary.min_hz,
        contour.summary.max_hz,
        contour.summary.avg_hz
    );
    Ok(contour)
}
