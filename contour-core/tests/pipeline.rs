//! End-to-end pipeline tests over synthetic signals.

use contour_core::{AnalysisConfig, AnalysisError, analyze, note};

fn sine(freq: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * secs) as usize;
    (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.8)
        .collect()
}

#[test]
fn one_second_of_a4_produces_a_flat_contour() {
    let sample_rate = 44100;
    let samples = sine(440.0, sample_rate, 1.0);
    let config = AnalysisConfig::default();

    let contour = analyze(&samples, sample_rate, &config).unwrap();

    // Every full frame's estimate lands within 2% of 440 Hz.
    let full_frames = samples.len() / config.frame_size;
    for m in contour.measurements.iter().take(full_frames) {
        assert!(
            (m.frequency_hz - 440.0).abs() < 440.0 * 0.02,
            "frame at {:.3}s measured {} Hz",
            m.timestamp_secs,
            m.frequency_hz
        );
    }

    // And so do the summary statistics.
    for value in [
        contour.summary.min_hz,
        contour.summary.max_hz,
        contour.summary.avg_hz,
    ] {
        assert!((value - 440.0).abs() < 440.0 * 0.02, "summary {value}");
    }

    assert!((contour.duration_secs - 1.0).abs() < 1e-6);
    assert_eq!(
        note::note_label(contour.summary.avg_hz).as_deref(),
        Some("A4")
    );
}

#[test]
fn silence_is_no_pitch_detected_not_a_zeroed_summary() {
    let samples = vec![0.0f32; 44100];
    let err = analyze(&samples, 44100, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::NoPitchDetected));
}

#[test]
fn empty_buffer_is_no_pitch_detected() {
    let err = analyze(&[], 44100, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::NoPitchDetected));
}

#[test]
fn timestamps_ascend_and_are_unique() {
    let samples = sine(220.0, 44100, 1.5);
    let contour = analyze(&samples, 44100, &AnalysisConfig::default()).unwrap();
    for pair in contour.measurements.windows(2) {
        assert!(pair[0].timestamp_secs < pair[1].timestamp_secs);
    }
}

#[test]
fn disabling_the_prefilter_still_detects_pitch() {
    let samples = sine(440.0, 44100, 0.5);
    let config = AnalysisConfig {
        lowpass_cutoff_hz: None,
        ..AnalysisConfig::default()
    };
    let contour = analyze(&samples, 44100, &config).unwrap();
    assert!((contour.summary.avg_hz - 440.0).abs() < 440.0 * 0.02);
}

#[test]
fn frequencies_above_the_ceiling_are_discarded() {
    // 6 kHz is above both the pre-filter cutoff and the hard ceiling, so
    // the contour must come out empty.
    let samples = sine(6000.0, 44100, 0.5);
    let err = analyze(&samples, 44100, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::NoPitchDetected));
}
