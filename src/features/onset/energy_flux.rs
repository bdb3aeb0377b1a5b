//! Energy-step onset detection
//!
//! Detects onsets from the frame-level amplitude (dB) history: an onset is a
//! loud enough rise that is also accelerating relative to the previous rise.
//!
//! Algorithm, per frame `t`:
//! 1. `rise = A[t] - A[t-1]`, `previous_rise = A[t-1] - A[t-2]`
//! 2. Onset if `rise > 3 dB` and `rise > 1.5 · previous_rise`
//! 3. Strength `clamp(rise / 10, 0, 1)`, otherwise 0
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use crate::features::history::History;

/// Capacity of the amplitude history
pub const AMPLITUDE_HISTORY: usize = 100;

/// Minimum rise (dB) between consecutive frames
pub const MIN_RISE_DB: f32 = 3.0;

/// How much larger than the previous rise the current one must be
pub const RISE_ACCELERATION: f32 = 1.5;

/// Rise (dB) that maps to full onset strength
pub const FULL_STRENGTH_RISE_DB: f32 = 10.0;

/// Onset strength of the newest entry of an amplitude history
///
/// Returns 0.0 with fewer than three entries.
pub fn onset_strength(amplitudes: &History<f32>) -> f32 {
    let (Some(&current), Some(&previous), Some(&before)) =
        (amplitudes.back(0), amplitudes.back(1), amplitudes.back(2))
    else {
        return 0.0;
    };

    let rise = current - previous;
    let previous_rise = previous - before;
    if !rise.is_finite() || !previous_rise.is_finite() {
        return 0.0;
    }

    if rise > MIN_RISE_DB && rise > RISE_ACCELERATION * previous_rise {
        (rise / FULL_STRENGTH_RISE_DB).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Rolling onset detector over frame amplitudes
#[derive(Debug, Clone)]
pub struct EnergyOnsetDetector {
    amplitudes: History<f32>,
}

impl EnergyOnsetDetector {
    /// Create a detector with an empty history
    pub fn new() -> Self {
        Self {
            amplitudes: History::new(AMPLITUDE_HISTORY),
        }
    }

    /// Record a frame amplitude (dB) and return its onset strength
    pub fn push(&mut self, amplitude_db: f32) -> f32 {
        self.amplitudes.push(amplitude_db);
        onset_strength(&self.amplitudes)
    }

    /// Stored amplitudes, oldest first
    pub fn amplitudes(&self) -> &History<f32> {
        &self.amplitudes
    }

    /// Forget all amplitudes
    pub fn reset(&mut self) {
        self.amplitudes.clear();
    }
}

impl Default for EnergyOnsetDetector {
    fn default() -> Self {
        Self::new()
    }
}
