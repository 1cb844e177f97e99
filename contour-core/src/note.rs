//! Equal-tempered note mapping.
//!
//! Maps continuous frequency to the nearest of the 12 semitone classes per
//! octave, referenced to A4 = 440 Hz. Also provides tuner-style helpers:
//! the nearest note with its target frequency, and cent deviation.

use once_cell::sync::Lazy;

/// Semitone class names, C first so `index % 12` lands on the right name.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Index of A4 in the C0-based semitone numbering.
const A4_INDEX: i32 = 57;

/// A single equal-tempered note.
#[derive(Debug, Clone)]
pub struct Note {
    /// Note name with octave, e.g. "A4".
    pub name: String,
    /// Equal-tempered target frequency in Hz.
    pub frequency: f32,
}

/// Statically computed equal-tempered notes from C0 to B8.
///
/// Computed once at startup; used for nearest-note lookups when a caller
/// needs the target frequency rather than just the label.
static NOTES: Lazy<Vec<Note>> = Lazy::new(|| {
    (0..108)
        .map(|i| {
            let frequency = 440.0 * 2.0_f32.powf((i as f32 - A4_INDEX as f32) / 12.0);
            let name = format!("{}{}", NOTE_NAMES[(i % 12) as usize], i / 12);
            Note { name, frequency }
        })
        .collect()
});

/// Maps a frequency to its nearest note label, e.g. `440.0` → `"A4"`.
///
/// Returns `None` for the no-pitch sentinel (`freq <= 0`) and for
/// frequencies below the C0 semitone grid. Not an error in either case.
pub fn note_label(frequency_hz: f32) -> Option<String> {
    if frequency_hz <= 0.0 {
        return None;
    }
    let semitone_offset = 12.0 * (frequency_hz / 440.0).log2();
    let note_index = semitone_offset.round() as i32 + A4_INDEX;
    if note_index < 0 {
        return None;
    }
    let octave = note_index / 12;
    let name = NOTE_NAMES[(note_index % 12) as usize];
    Some(format!("{}{}", name, octave))
}

/// Finds the nearest equal-tempered note and its target frequency.
pub fn nearest_note(frequency_hz: f32) -> Option<&'static Note> {
    if frequency_hz <= 0.0 {
        return None;
    }
    NOTES.iter().min_by(|a, b| {
        let diff_a = (a.frequency - frequency_hz).abs();
        let diff_b = (b.frequency - frequency_hz).abs();
        diff_a.partial_cmp(&diff_b).unwrap()
    })
}

/// Deviation of `freq` from `target_freq` in cents (100 cents per
/// semitone; positive means sharp).
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(note_label(440.0).as_deref(), Some("A4"));
    }

    #[test]
    fn middle_c() {
        assert_eq!(note_label(261.63).as_deref(), Some("C4"));
    }

    #[test]
    fn no_pitch_sentinel_maps_to_none() {
        assert_eq!(note_label(0.0), None);
        assert_eq!(note_label(-10.0), None);
    }

    #[test]
    fn subsonic_frequency_maps_to_none() {
        // Below the C0 grid entirely.
        assert_eq!(note_label(5.0), None);
    }

    #[test]
    fn slightly_sharp_a4_still_maps_to_a4() {
        assert_eq!(note_label(448.0).as_deref(), Some("A4"));
    }

    #[test]
    fn nearest_note_gives_target_frequency() {
        let note = nearest_note(442.0).unwrap();
        assert_eq!(note.name, "A4");
        assert!((note.frequency - 440.0).abs() < 0.01);
    }

    #[test]
    fn cents_deviation_of_octave_is_1200() {
        assert!((cents_deviation(880.0, 440.0) - 1200.0).abs() < 0.01);
    }
}
