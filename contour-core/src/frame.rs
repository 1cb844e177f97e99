//! Frame segmentation.
//!
//! Slices a decoded sample buffer into fixed-size analysis frames with
//! per-frame timestamps. Segmentation is deterministic and infallible: the
//! final frame is truncated rather than padded, and the segmenter can be
//! restarted to replay the same sequence.

/// A fixed-length contiguous slice of samples analyzed as one unit.
///
/// Immutable once segmented; amplitudes are normalized to [-1, 1].
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Position of this frame in the segmented sequence.
    pub index: usize,
    /// Offset of the first sample within the source buffer.
    pub start_sample: usize,
    /// Start time of the frame, `start_sample / sample_rate`.
    pub timestamp_secs: f32,
    /// The frame's samples. Shorter than the configured frame size only
    /// for the final frame.
    pub samples: &'a [f32],
}

impl Frame<'_> {
    /// Root-mean-square amplitude of the frame, a loudness proxy.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = self.samples.iter().map(|&s| s * s).sum();
        (sum_sq / self.samples.len() as f32).sqrt()
    }
}

/// Iterator producing [`Frame`]s over a sample buffer.
pub struct FrameSegmenter<'a> {
    samples: &'a [f32],
    sample_rate: u32,
    frame_size: usize,
    next_start: usize,
    next_index: usize,
}

impl<'a> FrameSegmenter<'a> {
    /// Creates a segmenter over `samples` at `sample_rate` with
    /// `frame_size` samples per frame.
    pub fn new(samples: &'a [f32], sample_rate: u32, frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame size must be nonzero");
        Self {
            samples,
            sample_rate,
            frame_size,
            next_start: 0,
            next_index: 0,
        }
    }

    /// Rewinds the segmenter to the start of the buffer.
    pub fn reset(&mut self) {
        self.next_start = 0;
        self.next_index = 0;
    }
}

impl<'a> Iterator for FrameSegmenter<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Frame<'a>> {
        if self.next_start >= self.samples.len() {
            return None;
        }
        let start = self.next_start;
        let end = (start + self.frame_size).min(self.samples.len());
        let frame = Frame {
            index: self.next_index,
            start_sample: start,
            timestamp_secs: start as f32 / self.sample_rate as f32,
            samples: &self.samples[start..end],
        };
        self.next_start = end;
        self.next_index += 1;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_full_and_truncated_frames() {
        let samples = vec![0.5f32; 2048 * 2 + 100];
        let frames: Vec<_> = FrameSegmenter::new(&samples, 44100, 2048).collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].samples.len(), 2048);
        assert_eq!(frames[1].samples.len(), 2048);
        assert_eq!(frames[2].samples.len(), 100);
        assert_eq!(frames[2].start_sample, 4096);
        assert_eq!(frames[2].index, 2);
    }

    #[test]
    fn timestamps_follow_sample_offsets() {
        let samples = vec![0.0f32; 4096];
        let frames: Vec<_> = FrameSegmenter::new(&samples, 44100, 2048).collect();
        assert_eq!(frames[0].timestamp_secs, 0.0);
        assert!((frames[1].timestamp_secs - 2048.0 / 44100.0).abs() < 1e-6);
    }

    #[test]
    fn empty_buffer_yields_no_frames() {
        let frames: Vec<_> = FrameSegmenter::new(&[], 44100, 2048).collect();
        assert!(frames.is_empty());
    }

    #[test]
    fn reset_replays_the_sequence() {
        let samples = vec![0.1f32; 5000];
        let mut seg = FrameSegmenter::new(&samples, 44100, 2048);
        let first: Vec<usize> = (&mut seg).map(|f| f.start_sample).collect();
        seg.reset();
        let second: Vec<usize> = seg.map(|f| f.start_sample).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rms_of_constant_signal() {
        let samples = vec![0.5f32; 2048];
        let frame = Frame {
            index: 0,
            start_sample: 0,
            timestamp_secs: 0.0,
            samples: &samples,
        };
        assert!((frame.rms() - 0.5).abs() < 1e-6);
    }
}
