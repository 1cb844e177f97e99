//! Contour cleanup: noise gating, outlier rejection and gap filling.
//!
//! The raw per-frame estimates are noisy in three distinct ways and each
//! stage targets exactly one of them: implausibly energetic high notes
//! (noise bursts), single-frame spikes, and short dropouts inside an
//! otherwise continuous tone. All three stages mutate `frequency_hz` in
//! place and never touch timestamps or RMS.

use crate::contour::FrameMeasurement;

/// Derives the global noise floor from the analysis signal.
///
/// The peak amplitude is sampled sparsely (every `stride` indices) rather
/// than scanned exhaustively, then scaled by `factor`.
pub fn noise_floor(samples: &[f32], stride: usize, factor: f32) -> f32 {
    let stride = stride.max(1);
    let peak = samples
        .iter()
        .step_by(stride)
        .map(|s| s.abs())
        .fold(0.0f32, f32::max);
    peak * factor
}

/// Suppresses energy-implausible high-frequency detections.
///
/// A detection above `min_frequency_hz` whose frame RMS sits below the
/// noise floor is almost always a noise burst, not a quiet high note; the
/// trade accepts rare suppression of genuine quiet high notes for a large
/// false-positive reduction.
pub fn gate_high_frequency_noise(
    measurements: &mut [FrameMeasurement],
    threshold: f32,
    min_frequency_hz: f32,
) {
    for m in measurements.iter_mut() {
        if m.frequency_hz > min_frequency_hz && m.rms < threshold {
            m.frequency_hz = 0.0;
        }
    }
}

/// Rejects single-frame spikes with a centered median filter.
///
/// Interior frames only: frames within half a window of either boundary
/// have insufficient context and are never altered. For each pitched
/// interior frame the nonzero values in `[i-half, i+half]` are gathered;
/// with fewer than three the frame is left alone, otherwise a value more
/// than 50% away from the window median is replaced by it. Each frame is
/// corrected at most once; there is no iterative refinement.
pub fn reject_outliers(measurements: &mut [FrameMeasurement], window: usize) {
    let half = window / 2;
    let len = measurements.len();
    if len <= half * 2 || half == 0 {
        return;
    }

    for i in half..(len - half) {
        if measurements[i].frequency_hz <= 0.0 {
            continue;
        }

        let mut neighbors: Vec<f32> = measurements[i - half..=i + half]
            .iter()
            .map(|m| m.frequency_hz)
            .filter(|&f| f > 0.0)
            .collect();
        if neighbors.len() < 3 {
            continue;
        }

        neighbors.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = neighbors[neighbors.len() / 2];

        if (measurements[i].frequency_hz - median).abs() > 0.5 * median {
            measurements[i].frequency_hz = median;
        }
    }
}

/// Forward-fills short dropouts with the last valid frequency.
///
/// A run of up to `max_gap_frames` consecutive unpitched frames bounded by
/// valid values on both sides is backfilled with the preceding valid
/// frequency (hold-last-value). Longer runs are true silence and stay
/// zero. A leading run with no prior valid value is never backfilled.
pub fn fill_short_gaps(measurements: &mut [FrameMeasurement], max_gap_frames: usize) {
    let mut last_valid: Option<f32> = None;
    let mut gap_start: Option<usize> = None;

    for i in 0..measurements.len() {
        if measurements[i].frequency_hz > 0.0 {
            if let (Some(start), Some(freq)) = (gap_start, last_valid) {
                let gap_len = i - start;
                if gap_len <= max_gap_frames {
                    for m in &mut measurements[start..i] {
                        m.frequency_hz = freq;
                    }
                }
            }
            gap_start = None;
            last_valid = Some(measurements[i].frequency_hz);
        } else if gap_start.is_none() {
            gap_start = Some(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(freqs: &[f32]) -> Vec<FrameMeasurement> {
        freqs
            .iter()
            .enumerate()
            .map(|(i, &f)| FrameMeasurement {
                timestamp_secs: i as f32 * 0.046,
                frequency_hz: f,
                rms: 0.5,
            })
            .collect()
    }

    fn freqs(measurements: &[FrameMeasurement]) -> Vec<f32> {
        measurements.iter().map(|m| m.frequency_hz).collect()
    }

    #[test]
    fn noise_floor_uses_sparse_peak() {
        let mut samples = vec![0.1f32; 3000];
        samples[500] = 1.0; // off-stride, invisible to the sparse scan
        samples[2000] = 0.5; // on-stride
        let floor = noise_floor(&samples, 1000, 0.08);
        assert!((floor - 0.5 * 0.08).abs() < 1e-6);
    }

    #[test]
    fn gate_zeroes_quiet_high_detections_only() {
        let mut ms = contour(&[2000.0, 2000.0, 440.0]);
        ms[0].rms = 0.01; // quiet high note: suppressed
        ms[1].rms = 0.5; // loud high note: kept
        ms[2].rms = 0.01; // quiet low note: kept, gate is high-frequency only
        gate_high_frequency_noise(&mut ms, 0.05, 1500.0);
        assert_eq!(freqs(&ms), vec![0.0, 2000.0, 440.0]);
    }

    #[test]
    fn outlier_spike_is_replaced_by_median() {
        let mut values = vec![220.0f32; 11];
        values[5] = 880.0; // lone spike, far beyond 50% of the median
        let mut ms = contour(&values);
        reject_outliers(&mut ms, 10);
        assert_eq!(ms[5].frequency_hz, 220.0);
    }

    #[test]
    fn boundary_frames_are_never_altered() {
        let mut values = vec![220.0f32; 20];
        values[1] = 880.0; // within half-window of the left edge
        values[18] = 880.0; // within half-window of the right edge
        let mut ms = contour(&values);
        reject_outliers(&mut ms, 10);
        assert_eq!(ms[1].frequency_hz, 880.0);
        assert_eq!(ms[18].frequency_hz, 880.0);
    }

    #[test]
    fn outlier_rejection_skips_sparse_windows() {
        // Only two nonzero values inside the window: not enough context.
        let mut values = vec![0.0f32; 15];
        values[7] = 880.0;
        values[8] = 220.0;
        let mut ms = contour(&values);
        reject_outliers(&mut ms, 10);
        assert_eq!(ms[7].frequency_hz, 880.0);
    }

    #[test]
    fn outlier_rejection_is_idempotent_once_within_tolerance() {
        let mut values = vec![220.0f32; 16];
        values[6] = 260.0; // within 50% of the median, left alone
        let mut ms = contour(&values);
        reject_outliers(&mut ms, 10);
        let once = freqs(&ms);
        reject_outliers(&mut ms, 10);
        assert_eq!(freqs(&ms), once);
    }

    #[test]
    fn short_gap_is_backfilled_with_preceding_value() {
        let mut ms = contour(&[440.0, 0.0, 0.0, 0.0, 450.0]);
        fill_short_gaps(&mut ms, 12);
        assert_eq!(freqs(&ms), vec![440.0, 440.0, 440.0, 440.0, 450.0]);
    }

    #[test]
    fn long_gap_stays_silent() {
        let mut values = vec![440.0];
        values.extend(std::iter::repeat(0.0).take(13));
        values.push(450.0);
        let mut ms = contour(&values);
        fill_short_gaps(&mut ms, 12);
        assert!(ms[1..14].iter().all(|m| m.frequency_hz == 0.0));
    }

    #[test]
    fn leading_gap_is_never_backfilled() {
        let mut ms = contour(&[0.0, 0.0, 440.0, 450.0]);
        fill_short_gaps(&mut ms, 12);
        assert_eq!(freqs(&ms), vec![0.0, 0.0, 440.0, 450.0]);
    }

    #[test]
    fn trailing_gap_stays_silent() {
        let mut ms = contour(&[440.0, 0.0, 0.0]);
        fill_short_gaps(&mut ms, 12);
        assert_eq!(freqs(&ms), vec![440.0, 0.0, 0.0]);
    }

    #[test]
    fn gap_at_exact_limit_is_filled() {
        let mut values = vec![440.0];
        values.extend(std::iter::repeat(0.0).take(12));
        values.push(450.0);
        let mut ms = contour(&values);
        fill_short_gaps(&mut ms, 12);
        assert!(ms[1..13].iter().all(|m| m.frequency_hz == 440.0));
    }
}
