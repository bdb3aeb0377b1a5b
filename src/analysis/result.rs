//! Analysis result types

use serde::{Deserialize, Serialize};

use crate::features::beat_tracking::RhythmState;
use crate::features::classification::HarmonicFeatures;
use crate::features::chroma::ChromaVector;
use crate::features::key::KeyEstimate;
use crate::features::notes::NOTE_NAMES;
use crate::features::pitch::PitchCandidate;
use crate::features::segmentation::HarmonyAnalysis;

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Key {
    /// Build a key from a tonic pitch class and a mode
    pub fn new(root: u32, mode: Mode) -> Self {
        match mode {
            Mode::Major => Key::Major(root % 12),
            Mode::Minor => Key::Minor(root % 12),
        }
    }

    /// Tonic pitch class (0 = C)
    pub fn root(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % 12,
        }
    }

    /// Major or minor
    pub fn mode(&self) -> Mode {
        match self {
            Key::Major(_) => Mode::Major,
            Key::Minor(_) => Mode::Minor,
        }
    }

    /// Tonic name without the mode suffix (e.g., "F#")
    pub fn tonic_name(&self) -> &'static str {
        NOTE_NAMES[self.root() as usize]
    }

    /// Get key name in musical notation (e.g., "C", "Am", "F#", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_live::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).name(), "C");
    /// assert_eq!(Key::Major(6).name(), "F#");
    /// assert_eq!(Key::Minor(9).name(), "Am");
    /// assert_eq!(Key::Minor(1).name(), "C#m");
    /// ```
    pub fn name(&self) -> String {
        match self.mode() {
            Mode::Major => self.tonic_name().to_string(),
            Mode::Minor => format!("{}m", self.tonic_name()),
        }
    }
}

/// Pipeline state of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingState {
    /// Gate closed or unusable frame
    Idle,
    /// Gate open but no pitch found
    Processing,
    /// Pitched content rejected as noise or voice
    NoiseDetected,
    /// Pitched content accepted as music
    MusicalInput,
}

/// Complete analysis of one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameAnalysis {
    /// Pipeline state
    pub state: ProcessingState,

    /// Highest-confidence pitch candidate, if any
    pub primary_pitch: Option<PitchCandidate>,

    /// Chroma vector (musical frames only)
    pub chroma: Option<ChromaVector>,

    /// Frame RMS level in dB (floor −90)
    pub amplitude_db: f32,

    /// Noise gate decision
    pub noise_gate_open: bool,

    /// Melody/harmony split (type `None` when there is nothing to report)
    pub harmony: HarmonyAnalysis,

    /// Smoothed key estimate, or the forced key while overridden
    pub key: Option<KeyEstimate>,

    /// Tempo and beat phase
    pub rhythm: RhythmState,

    /// Classifier feature snapshot (frames that reached the classifier)
    pub features: Option<HarmonicFeatures>,

    /// Frame timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl FrameAnalysis {
    /// True when the frame was classified as musical input
    pub fn is_musical(&self) -> bool {
        self.state == ProcessingState::MusicalInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_major() {
        assert_eq!(Key::Major(0).name(), "C");
        assert_eq!(Key::Major(1).name(), "C#");
        assert_eq!(Key::Major(6).name(), "F#");
        assert_eq!(Key::Major(11).name(), "B");
    }

    #[test]
    fn test_key_name_minor() {
        assert_eq!(Key::Minor(0).name(), "Cm");
        assert_eq!(Key::Minor(9).name(), "Am");
        assert_eq!(Key::Minor(11).name(), "Bm");
    }

    #[test]
    fn test_root_and_mode() {
        let key = Key::new(14, Mode::Minor);
        assert_eq!(key, Key::Minor(2));
        assert_eq!(key.root(), 2);
        assert_eq!(key.mode(), Mode::Minor);
        assert_eq!(key.tonic_name(), "D");
        assert_eq!(Key::new(7, Mode::Major).name(), "G");
    }
}
