//! Melody versus chord classification of pitch candidates
//!
//! # Default mode
//!
//! - One candidate: a melody note, debounced so a changed note must differ
//!   for 200 ms before it replaces the remembered one
//! - Two or more: sorted low to high; if any adjacent interval is a third,
//!   fourth or fifth (3, 4, 5 or 7 semitones) and there are at least three
//!   notes, the set is a chord. Otherwise the highest note is the melody and
//!   the rest are chord tones.
//!
//! # Polyphonic mode
//!
//! Every candidate above a minimal confidence is a chord tone and the frame is
//! always reported as a chord. A frame with fewer than two such candidates
//! reuses the previous chord for up to 50 ms, then reports an empty chord.

use super::{HarmonyAnalysis, HarmonyType};
use crate::features::beat_tracking::RhythmState;
use crate::features::notes::{note_name, semitone_interval};
use crate::features::pitch::PitchCandidate;

/// A changed melody note is held back for this long (ms)
pub const MELODY_DEBOUNCE_MS: f64 = 200.0;

/// A chord may be reused for this long when a frame drops notes (ms)
pub const CHORD_HOLD_MS: f64 = 50.0;

/// Minimum confidence of a chord tone in polyphonic mode
pub const POLYPHONIC_MIN_CONFIDENCE: f32 = 0.05;

/// Adjacent intervals (semitones) that mark a chord
pub const CHORD_INTERVALS: [i32; 4] = [3, 4, 5, 7];

/// Notes needed for the interval test to declare a chord
pub const MIN_CHORD_NOTES: usize = 3;

/// Stateful segmenter, one per session
#[derive(Debug, Clone)]
pub struct MelodyHarmonySegmenter {
    polyphonic: bool,
    /// Last accepted melody note and when it was accepted
    melody: Option<(String, f64)>,
    /// Last polyphonic chord and when it was seen
    chord: Option<(Vec<String>, f64)>,
}

impl MelodyHarmonySegmenter {
    /// Create a segmenter in default or polyphonic mode
    pub fn new(polyphonic: bool) -> Self {
        Self {
            polyphonic,
            melody: None,
            chord: None,
        }
    }

    /// True in polyphonic mode
    pub fn is_polyphonic(&self) -> bool {
        self.polyphonic
    }

    /// Classify one frame's ranked candidates
    pub fn segment(
        &mut self,
        candidates: &[PitchCandidate],
        rhythm: RhythmState,
        timestamp_ms: f64,
    ) -> HarmonyAnalysis {
        let usable: Vec<&PitchCandidate> = candidates
            .iter()
            .filter(|c| note_name(c.frequency).is_some())
            .collect();

        if self.polyphonic {
            return self.segment_polyphonic(&usable, rhythm, timestamp_ms);
        }

        match usable.as_slice() {
            [] => HarmonyAnalysis::none(rhythm),
            [single] => {
                let note = self.debounce_melody(single.frequency, timestamp_ms);
                HarmonyAnalysis {
                    melody_notes: note.into_iter().collect(),
                    chord_notes: Vec::new(),
                    rhythm,
                    harmony_type: HarmonyType::Melody,
                }
            }
            _ => split_melody_and_chord(&usable, rhythm),
        }
    }

    /// Forget the remembered melody note and chord
    pub fn reset(&mut self) {
        self.melody = None;
        self.chord = None;
    }

    fn debounce_melody(&mut self, frequency: f32, timestamp_ms: f64) -> Option<String> {
        let note = note_name(frequency)?.to_string();
        if let Some((previous, since)) = &self.melody {
            if *previous != note && timestamp_ms - since < MELODY_DEBOUNCE_MS {
                log::trace!("Melody {} held over {}", previous, note);
                return Some(previous.clone());
            }
        }
        self.melody = Some((note.clone(), timestamp_ms));
        Some(note)
    }

    fn segment_polyphonic(
        &mut self,
        usable: &[&PitchCandidate],
        rhythm: RhythmState,
        timestamp_ms: f64,
    ) -> HarmonyAnalysis {
        let confident: Vec<f32> = usable
            .iter()
            .filter(|c| c.confidence > POLYPHONIC_MIN_CONFIDENCE)
            .map(|c| c.frequency)
            .collect();

        let chord_notes = if confident.len() >= 2 {
            let notes = unique_note_names(sorted(confident));
            self.chord = Some((notes.clone(), timestamp_ms));
            notes
        } else {
            match &self.chord {
                Some((notes, since)) if timestamp_ms - since < CHORD_HOLD_MS => notes.clone(),
                _ => Vec::new(),
            }
        };

        HarmonyAnalysis {
            melody_notes: Vec::new(),
            chord_notes,
            rhythm,
            harmony_type: HarmonyType::Chord,
        }
    }
}

/// Two or more candidates in default mode
fn split_melody_and_chord(usable: &[&PitchCandidate], rhythm: RhythmState) -> HarmonyAnalysis {
    let freqs = sorted(usable.iter().map(|c| c.frequency).collect());

    let has_chord_interval = freqs
        .windows(2)
        .filter_map(|w| semitone_interval(w[0], w[1]))
        .any(|interval| CHORD_INTERVALS.contains(&interval));

    if has_chord_interval && freqs.len() >= MIN_CHORD_NOTES {
        return HarmonyAnalysis {
            melody_notes: Vec::new(),
            chord_notes: unique_note_names(freqs),
            rhythm,
            harmony_type: HarmonyType::Chord,
        };
    }

    let Some((&top, lower)) = freqs.split_last() else {
        return HarmonyAnalysis::none(rhythm);
    };
    HarmonyAnalysis {
        melody_notes: note_name(top).map(str::to_string).into_iter().collect(),
        chord_notes: unique_note_names(lower.to_vec()),
        rhythm,
        harmony_type: HarmonyType::Both,
    }
}

fn sorted(mut freqs: Vec<f32>) -> Vec<f32> {
    freqs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    freqs
}

/// Pitch-class names in input order, first occurrence kept
fn unique_note_names(freqs: Vec<f32>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(freqs.len());
    for name in freqs.into_iter().filter_map(note_name) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(freqs: &[(f32, f32)]) -> Vec<PitchCandidate> {
        freqs
            .iter()
            .map(|&(frequency, confidence)| PitchCandidate {
                frequency,
                confidence,
                timestamp_ms: 0.0,
            })
            .collect()
    }

    fn rhythm() -> RhythmState {
        RhythmState::default()
    }

    #[test]
    fn test_no_candidates() {
        let mut segmenter = MelodyHarmonySegmenter::new(false);
        let analysis = segmenter.segment(&[], rhythm(), 0.0);
        assert_eq!(analysis.harmony_type, HarmonyType::None);
        assert!(analysis.melody_notes.is_empty());
        assert!(analysis.chord_notes.is_empty());
    }

    #[test]
    fn test_c_major_triad_is_chord() {
        let mut segmenter = MelodyHarmonySegmenter::new(false);
        let triad = candidates(&[(392.0, 0.7), (261.63, 0.9), (329.63, 0.8)]);
        let analysis = segmenter.segment(&triad, rhythm(), 0.0);
        assert_eq!(analysis.harmony_type, HarmonyType::Chord);
        assert_eq!(analysis.chord_notes, vec!["C", "E", "G"]);
        assert!(analysis.melody_notes.is_empty());
    }

    #[test]
    fn test_two_notes_are_melody_over_chord() {
        let mut segmenter = MelodyHarmonySegmenter::new(false);
        // a fifth, but only two notes
        let pair = candidates(&[(220.0, 0.9), (329.63, 0.6)]);
        let analysis = segmenter.segment(&pair, rhythm(), 0.0);
        assert_eq!(analysis.harmony_type, HarmonyType::Both);
        assert_eq!(analysis.melody_notes, vec!["E"]);
        assert_eq!(analysis.chord_notes, vec!["A"]);
    }

    #[test]
    fn test_octaves_without_chord_interval() {
        let mut segmenter = MelodyHarmonySegmenter::new(false);
        let octaves = candidates(&[(110.0, 0.9), (220.0, 0.8), (440.0, 0.7)]);
        let analysis = segmenter.segment(&octaves, rhythm(), 0.0);
        assert_eq!(analysis.harmony_type, HarmonyType::Both);
        assert_eq!(analysis.melody_notes, vec!["A"]);
        // both lower notes fold to the same pitch class
        assert_eq!(analysis.chord_notes, vec!["A"]);
    }

    #[test]
    fn test_melody_debounce() {
        let mut segmenter = MelodyHarmonySegmenter::new(false);
        let a = candidates(&[(440.0, 0.9)]);
        let b = candidates(&[(493.88, 0.9)]);

        assert_eq!(segmenter.segment(&a, rhythm(), 0.0).melody_notes, vec!["A"]);
        assert_eq!(segmenter.segment(&a, rhythm(), 100.0).melody_notes, vec!["A"]);
        // B arrives 50 ms after A was last confirmed: held back
        let held = segmenter.segment(&b, rhythm(), 150.0);
        assert_eq!(held.harmony_type, HarmonyType::Melody);
        assert_eq!(held.melody_notes, vec!["A"]);
        // 200 ms after A was last confirmed: accepted
        assert_eq!(segmenter.segment(&b, rhythm(), 300.0).melody_notes, vec!["B"]);
        assert_eq!(segmenter.segment(&b, rhythm(), 320.0).melody_notes, vec!["B"]);
    }

    #[test]
    fn test_polyphonic_chord_and_hold() {
        let mut segmenter = MelodyHarmonySegmenter::new(true);
        assert!(segmenter.is_polyphonic());
        let dyad = candidates(&[(440.0, 0.5), (261.63, 0.3), (500.0, 0.01)]);
        let analysis = segmenter.segment(&dyad, rhythm(), 0.0);
        assert_eq!(analysis.harmony_type, HarmonyType::Chord);
        assert_eq!(analysis.chord_notes, vec!["C", "A"]);
        assert!(analysis.melody_notes.is_empty());

        // a single note 30 ms later reuses the chord
        let single = candidates(&[(440.0, 0.5)]);
        let held = segmenter.segment(&single, rhythm(), 30.0);
        assert_eq!(held.chord_notes, vec!["C", "A"]);

        // after the hold window the chord is empty but still a chord
        let expired = segmenter.segment(&single, rhythm(), 80.0);
        assert_eq!(expired.harmony_type, HarmonyType::Chord);
        assert!(expired.chord_notes.is_empty());
        assert!(expired.melody_notes.is_empty());
    }

    #[test]
    fn test_polyphonic_without_chord_is_empty_chord() {
        let mut segmenter = MelodyHarmonySegmenter::new(true);
        for frame in [candidates(&[(220.0, 0.9)]), candidates(&[])] {
            let analysis = segmenter.segment(&frame, rhythm(), 0.0);
            assert_eq!(analysis.harmony_type, HarmonyType::Chord);
            assert!(analysis.chord_notes.is_empty());
            assert!(analysis.melody_notes.is_empty());
        }
    }

    #[test]
    fn test_invalid_frequencies_ignored() {
        let mut segmenter = MelodyHarmonySegmenter::new(false);
        let bad = candidates(&[(f32::NAN, 0.9), (0.0, 0.5), (440.0, 0.4)]);
        let analysis = segmenter.segment(&bad, rhythm(), 0.0);
        assert_eq!(analysis.harmony_type, HarmonyType::Melody);
        assert_eq!(analysis.melody_notes, vec!["A"]);
    }

    #[test]
    fn test_reset_forgets_melody() {
        let mut segmenter = MelodyHarmonySegmenter::new(false);
        segmenter.segment(&candidates(&[(440.0, 0.9)]), rhythm(), 0.0);
        segmenter.reset();
        let next = segmenter.segment(&candidates(&[(493.88, 0.9)]), rhythm(), 10.0);
        assert_eq!(next.melody_notes, vec!["B"]);
    }
}
