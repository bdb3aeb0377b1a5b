//! Melody/harmony segmentation
//!
//! Splits a frame's ranked pitch candidates into a melodic line and
//! accompanying chord tones.

pub mod melody_harmony;

pub use melody_harmony::MelodyHarmonySegmenter;

use serde::Serialize;

use crate::features::beat_tracking::RhythmState;

/// What a frame's pitch content was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarmonyType {
    /// Single melodic note
    Melody,
    /// Chord tones only
    Chord,
    /// Melody note over lower chord tones
    Both,
    /// No pitch content
    None,
}

/// Melody/harmony split of one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarmonyAnalysis {
    /// Melodic notes (pitch-class names), at most one per frame
    pub melody_notes: Vec<String>,

    /// Chord tones (pitch-class names), unique, lowest first
    pub chord_notes: Vec<String>,

    /// Rhythm snapshot of the same frame
    pub rhythm: RhythmState,

    /// Classification of the frame
    pub harmony_type: HarmonyType,
}

impl HarmonyAnalysis {
    /// Empty analysis for a frame without pitch content
    pub fn none(rhythm: RhythmState) -> Self {
        Self {
            melody_notes: Vec::new(),
            chord_notes: Vec::new(),
            rhythm,
            harmony_type: HarmonyType::None,
        }
    }
}
