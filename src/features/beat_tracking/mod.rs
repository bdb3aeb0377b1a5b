//! Beat tracking modules
//!
//! Live tempo and beat phase from registered onsets:
//! - Beat registration with a refractory window
//! - Tempo from the mean inter-beat interval, smoothed over recent estimates
//! - Beat position within a fixed 4/4 bar

pub mod rhythm;

pub use rhythm::RhythmAnalyzer;

use serde::{Deserialize, Serialize};

/// Tempo reported before enough beats have been registered
pub const DEFAULT_TEMPO_BPM: f32 = 120.0;

/// Beats per bar (meter is fixed at 4/4)
pub const BEATS_PER_BAR: u32 = 4;

/// Rhythm snapshot for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhythmState {
    /// Smoothed tempo in BPM (60-200)
    pub tempo_bpm: f32,

    /// Onset strength of the current frame (0.0-1.0)
    pub beat_strength: f32,

    /// Beat position within the bar (1-4)
    pub current_beat: u32,

    /// Frame lies within 100 ms after a registered beat
    pub is_on_beat: bool,
}

impl Default for RhythmState {
    fn default() -> Self {
        Self {
            tempo_bpm: DEFAULT_TEMPO_BPM,
            beat_strength: 0.0,
            current_beat: 1,
            is_on_beat: false,
        }
    }
}
