//! Per-frame pitch estimation.
//!
//! The pipeline treats the estimator as a pluggable capability: one frame
//! in, one optional fundamental frequency out. The default implementation
//! is a YIN detector with an amplitude gate, clarity checking to reject
//! noise, parabolic interpolation for sub-sample accuracy, and an optional
//! spectrum-based refinement pass.

use crate::spectrum;

/// A pluggable per-frame pitch detector.
///
/// Implementations must be stateless across frames (`Send + Sync`) so the
/// pipeline may fan frames out across worker threads.
pub trait PitchEstimator: Send + Sync {
    /// Estimates the fundamental frequency of one frame.
    ///
    /// Returns `None` when the frame carries no detectable pitch (silence,
    /// noise, or too little signal). That is the normal sentinel, not an
    /// error.
    fn detect(&self, frame: &[f32], sample_rate: u32) -> Option<f32>;
}

/// YIN pitch detector with noise rejection.
#[derive(Debug, Clone)]
pub struct YinEstimator {
    /// Frames with RMS below this value are treated as silence.
    pub amplitude_threshold: f32,
    /// Maximum normalized-difference value at the chosen dip; higher
    /// values mean the frame is likely noise and is rejected.
    pub clarity_threshold: f32,
    /// Refine the rough estimate against the frame's magnitude spectrum.
    pub refine_with_spectrum: bool,
}

impl Default for YinEstimator {
    fn default() -> Self {
        Self {
            amplitude_threshold: 0.01,
            clarity_threshold: 0.1,
            refine_with_spectrum: true,
        }
    }
}

impl PitchEstimator for YinEstimator {
    fn detect(&self, frame: &[f32], sample_rate: u32) -> Option<f32> {
        let rough = self.detect_rough(frame, sample_rate)?;
        if self.refine_with_spectrum {
            let magnitudes = spectrum::magnitude_spectrum(frame);
            Some(refine_from_spectrum(&magnitudes, rough, sample_rate).unwrap_or(rough))
        } else {
            Some(rough)
        }
    }
}

impl YinEstimator {
    /// Time-domain YIN estimate without spectral refinement.
    fn detect_rough(&self, frame: &[f32], sample_rate: u32) -> Option<f32> {
        let frame_size = frame.len();
        if frame_size < 4 {
            return None;
        }
        let half = frame_size / 2;

        // Amplitude gate: skip silence outright.
        let rms = (frame.iter().map(|&s| s * s).sum::<f32>() / frame_size as f32).sqrt();
        if rms < self.amplitude_threshold {
            return None;
        }

        // Squared difference function.
        let mut yin_buffer = vec![0.0f32; half];
        for tau in 1..half {
            let mut diff = 0.0;
            for i in 0..half {
                let delta = frame[i] - frame[i + tau];
                diff += delta * delta;
            }
            yin_buffer[tau] = diff;
        }

        // Cumulative mean normalized difference.
        let mut running_sum = 0.0;
        yin_buffer[0] = 1.0;
        for tau in 1..half {
            running_sum += yin_buffer[tau];
            if running_sum != 0.0 {
                yin_buffer[tau] *= tau as f32 / running_sum;
            } else {
                yin_buffer[tau] = 1.0;
            }
        }

        // Take the first dip near the global minimum instead of the first
        // dip under a fixed threshold; this avoids octave errors.
        let min_val = yin_buffer
            .iter()
            .skip(1)
            .cloned()
            .fold(f32::INFINITY, f32::min);
        let threshold = min_val + 0.05;

        let mut period = 0;
        for tau in 2..half {
            if yin_buffer[tau] < threshold && yin_buffer[tau] < yin_buffer[tau - 1] {
                period = tau;
                break;
            }
        }

        // A clear tone has a very low value at the dip; anything else is
        // likely noise.
        if period == 0 || yin_buffer[period] > self.clarity_threshold {
            return None;
        }
        if period + 1 >= half {
            return None;
        }

        // Parabolic interpolation around the dip for sub-sample accuracy.
        let y1 = yin_buffer[period - 1];
        let y2 = yin_buffer[period];
        let y3 = yin_buffer[period + 1];

        let period_float = if (y1 - 2.0 * y2 + y3) != 0.0 {
            let peak_shift = (y1 - y3) / (2.0 * (y1 - 2.0 * y2 + y3));
            period as f32 + peak_shift
        } else {
            period as f32
        };

        let frequency = sample_rate as f32 / period_float;
        if frequency.is_finite() && frequency > 20.0 {
            Some(frequency)
        } else {
            None
        }
    }
}

/// Refines a rough frequency estimate against a magnitude spectrum.
///
/// Finds the spectral peak nearest the rough estimate and applies parabolic
/// interpolation over log magnitudes for sub-bin accuracy. Falls back to
/// the rough estimate whenever the neighborhood is unusable.
fn refine_from_spectrum(magnitudes: &[f32], rough_freq: f32, sample_rate: u32) -> Option<f32> {
    if rough_freq <= 0.0 || magnitudes.len() < 3 {
        return None;
    }
    let buffer_size = magnitudes.len() * 2;
    let target_bin = (rough_freq * buffer_size as f32) / sample_rate as f32;
    let search_radius = 2.0;
    let start_bin = (target_bin - search_radius).max(0.0) as usize;
    let end_bin = (target_bin + search_radius).min((magnitudes.len() - 1) as f32) as usize;
    if start_bin >= end_bin {
        return Some(rough_freq);
    }

    let peak_bin = magnitudes[start_bin..=end_bin]
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(offset, _)| start_bin + offset)?;

    if peak_bin == 0 || peak_bin >= magnitudes.len() - 1 {
        return Some(rough_freq);
    }

    let y1 = magnitudes[peak_bin - 1].ln();
    let y2 = magnitudes[peak_bin].ln();
    let y3 = magnitudes[peak_bin + 1].ln();
    if !y1.is_finite() || !y2.is_finite() || !y3.is_finite() {
        return Some(rough_freq);
    }

    let denominator = 2.0 * y2 - y1 - y3;
    if denominator.abs() < 1e-6 {
        return Some(rough_freq);
    }

    let peak_shift = (y3 - y1) / (2.0 * denominator);
    let interpolated_bin = peak_bin as f32 + peak_shift;
    let final_freq = (interpolated_bin * sample_rate as f32) / buffer_size as f32;

    if final_freq.is_finite() && final_freq > 0.0 {
        Some(final_freq)
    } else {
        Some(rough_freq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn detects_a4_within_two_percent() {
        let frame = sine(440.0, 44100.0, 2048);
        let freq = YinEstimator::default().detect(&frame, 44100).unwrap();
        assert!((freq - 440.0).abs() < 440.0 * 0.02, "got {freq}");
    }

    #[test]
    fn detects_low_pitch() {
        let frame = sine(110.0, 44100.0, 2048);
        let freq = YinEstimator::default().detect(&frame, 44100).unwrap();
        assert!((freq - 110.0).abs() < 110.0 * 0.02, "got {freq}");
    }

    #[test]
    fn silence_yields_none() {
        let frame = vec![0.0f32; 2048];
        assert!(YinEstimator::default().detect(&frame, 44100).is_none());
    }

    #[test]
    fn quiet_signal_is_gated() {
        let frame: Vec<f32> = sine(440.0, 44100.0, 2048)
            .into_iter()
            .map(|s| s * 0.001)
            .collect();
        assert!(YinEstimator::default().detect(&frame, 44100).is_none());
    }

    #[test]
    fn tiny_frame_yields_none() {
        assert!(YinEstimator::default().detect(&[0.5, -0.5], 44100).is_none());
    }
}
