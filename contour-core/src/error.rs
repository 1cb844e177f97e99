//! Error types for the pitch analysis pipeline.
//!
//! The taxonomy is deliberately small: a failed decode kills the whole
//! analysis run, an inaccessible input device kills live mode only, and a
//! contour without a single usable frequency is a defined terminal outcome
//! rather than a fault. Per-frame "no pitch" is never an error; it is the
//! normal sentinel value threaded through every pipeline stage.

use thiserror::Error;

/// Errors surfaced by the analysis pipeline and live monitoring.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The audio source could not be decoded. Fatal to that analysis run;
    /// no partial contour is produced.
    #[error("failed to decode audio source: {0}")]
    Decode(String),

    /// No frame in the recording yielded a usable frequency. This is a
    /// terminal outcome, not a fault: summary statistics are undefined and
    /// the caller must stop rather than proceed to note mapping.
    #[error("no pitch detected: the recording contains no frames with a usable frequency")]
    NoPitchDetected,

    /// The audio input device is unavailable or access was denied. Fatal
    /// only to live monitoring; file analysis is unaffected.
    #[error("audio input device unavailable: {0}")]
    DeviceAccess(String),
}
