//! Magnitude-spectrum computation used for estimate refinement.
//!
//! The estimator's time-domain result is refined against an FFT magnitude
//! spectrum, so the signal is conditioned first: DC removal keeps the 0 Hz
//! bin from dominating, and a Hann window limits spectral leakage.

use rustfft::{FftPlanner, num_complex::Complex};

/// Removes the DC offset from a signal by making its average value zero.
fn remove_dc_offset(signal: &mut [f32]) {
    let len = signal.len();
    if len == 0 {
        return;
    }
    let avg = signal.iter().sum::<f32>() / len as f32;
    if avg.abs() > 1e-6 {
        for sample in signal.iter_mut() {
            *sample -= avg;
        }
    }
}

/// Applies a Hann window in place to reduce spectral leakage.
fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let n_minus_1 = (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// Computes the one-sided magnitude spectrum of `signal`.
///
/// The signal is DC-corrected and Hann-windowed before the forward FFT.
/// Only the first half of the spectrum is returned; bins above Nyquist are
/// redundant for a real signal.
pub fn magnitude_spectrum(signal: &[f32]) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }

    let mut processed = signal.to_vec();
    remove_dc_offset(&mut processed);
    apply_hann_window(&mut processed);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(processed.len());

    let mut buffer: Vec<Complex<f32>> = processed
        .into_iter()
        .map(|sample| Complex { re: sample, im: 0.0 })
        .collect();
    fft.process(&mut buffer);

    buffer
        .iter()
        .take(signal.len() / 2)
        .map(|c| c.norm())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_peak_lands_in_expected_bin() {
        let sample_rate = 44100.0f32;
        let n = 2048;
        let freq = 440.0f32;
        let signal: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect();

        let mags = magnitude_spectrum(&signal);
        assert_eq!(mags.len(), n / 2);

        let peak_bin = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let expected = (freq * n as f32 / sample_rate).round() as usize;
        assert!(peak_bin.abs_diff(expected) <= 1);
    }

    #[test]
    fn empty_signal_yields_empty_spectrum() {
        assert!(magnitude_spectrum(&[]).is_empty());
    }
}
