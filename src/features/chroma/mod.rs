//! Chroma extraction
//!
//! Pitch-class energy distribution (12 semitones) of a single frame.

pub mod extractor;

use serde::Serialize;

use crate::features::notes::NOTE_NAMES;

/// 12-bin pitch-class distribution, index 0 = C
///
/// Values sum to 1, or are all zero for a frame without in-band energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChromaVector {
    /// Normalized bucket energies
    pub values: [f32; 12],

    /// Index of the strongest bucket
    pub dominant: usize,

    /// Normalized value of the strongest bucket (0.0-1.0)
    pub confidence: f32,
}

impl ChromaVector {
    /// Normalize raw bucket energies
    pub fn from_energies(mut values: [f32; 12]) -> Self {
        for v in values.iter_mut() {
            if !v.is_finite() || *v < 0.0 {
                *v = 0.0;
            }
        }

        let sum: f32 = values.iter().sum();
        if sum > 0.0 {
            for v in values.iter_mut() {
                *v /= sum;
            }
        }

        let (dominant, confidence) = values
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, 0.0f32), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });

        Self {
            values,
            dominant,
            confidence,
        }
    }

    /// All-zero vector
    pub fn silent() -> Self {
        Self::from_energies([0.0; 12])
    }

    /// Sum of all buckets (1.0 or 0.0)
    pub fn sum(&self) -> f32 {
        self.values.iter().sum()
    }

    /// True when no bucket carries energy
    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Name of the dominant pitch class
    pub fn dominant_name(&self) -> &'static str {
        NOTE_NAMES[self.dominant % 12]
    }
}
