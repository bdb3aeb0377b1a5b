//! Frequency ↔ pitch-class conversions (A4 = 440 Hz, equal temperament)

/// Pitch-class names, index 0 = C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Reference frequency for A4
pub const A4_HZ: f32 = 440.0;

/// Fractional MIDI note number (`12·log2(f/440) + 69`)
///
/// Returns `None` for zero, negative or non-finite input.
pub fn fractional_midi(freq: f32) -> Option<f32> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    Some(12.0 * (freq / A4_HZ).log2() + 69.0)
}

/// Nearest MIDI note number
pub fn nearest_midi(freq: f32) -> Option<i32> {
    fractional_midi(freq).map(|m| m.round() as i32)
}

/// Pitch class (0-11) of the nearest MIDI note
pub fn pitch_class(freq: f32) -> Option<usize> {
    nearest_midi(freq).map(|m| m.rem_euclid(12) as usize)
}

/// Name of the nearest pitch class, e.g. `"A"` for 440 Hz
pub fn note_name(freq: f32) -> Option<&'static str> {
    pitch_class(freq).map(|pc| NOTE_NAMES[pc])
}

/// Rounded interval in semitones from `low` to `high`
pub fn semitone_interval(low: f32, high: f32) -> Option<i32> {
    if !(low.is_finite() && high.is_finite()) || low <= 0.0 || high <= 0.0 {
        return None;
    }
    Some((12.0 * (high / low).log2()).round() as i32)
}
