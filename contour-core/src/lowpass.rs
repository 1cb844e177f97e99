//! Optional low-pass pre-filter for the analysis signal.
//!
//! A second-order biquad (RBJ cookbook coefficients, Butterworth Q) applied
//! only to the analysis copy of the buffer; the audible playback buffer is
//! never filtered. Output length always equals input length.

use std::f32::consts::{FRAC_1_SQRT_2, PI};

/// Single biquad low-pass section.
pub struct LowPassFilter {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPassFilter {
    /// Builds a low-pass section with the given cutoff. The cutoff is
    /// clamped below Nyquist to keep the coefficients stable.
    pub fn new(cutoff_hz: f32, sample_rate: u32) -> Self {
        let nyquist = sample_rate as f32 / 2.0;
        let cutoff = cutoff_hz.clamp(1.0, nyquist * 0.99);

        let omega = 2.0 * PI * cutoff / sample_rate as f32;
        let (sin_w, cos_w) = omega.sin_cos();
        let q = FRAC_1_SQRT_2;
        let alpha = sin_w / (2.0 * q);

        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 - cos_w) / 2.0) / a0,
            b1: (1.0 - cos_w) / a0,
            b2: ((1.0 - cos_w) / 2.0) / a0,
            a1: (-2.0 * cos_w) / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Processes one sample through the section.
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Filters a whole buffer, returning a new buffer of the same length.
pub fn apply_low_pass(samples: &[f32], sample_rate: u32, cutoff_hz: f32) -> Vec<f32> {
    let mut filter = LowPassFilter::new(cutoff_hz, sample_rate);
    samples.iter().map(|&s| filter.process(s)).collect()
}
