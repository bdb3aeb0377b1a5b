//! Chroma vector extraction
//!
//! Folds the magnitude spectrum of one frame into 12 pitch-class buckets.
//!
//! # Algorithm
//!
//! For every bin in `[min_hz, max_hz]` with linear magnitude above
//! [`LINEAR_FLOOR`]:
//! 1. `midi = 12·log2(f / 440) + 69`, rounded to the nearest integer
//! 2. `pitch_class = midi mod 12`
//! 3. Add the linear magnitude to that bucket
//!
//! The buckets are then normalized to sum to 1 (or left at zero).

use super::ChromaVector;
use crate::features::notes::pitch_class;
use crate::features::spectrum::{Spectrum, LINEAR_FLOOR};

/// Lowest frequency folded into the chroma vector (Hz)
pub const CHROMA_MIN_HZ: f32 = 80.0;

/// Highest frequency folded into the chroma vector (Hz)
pub const CHROMA_MAX_HZ: f32 = 2000.0;

/// Extract the chroma vector of one frame
///
/// # Example
///
/// ```
/// use stratum_live::features::chroma::extractor::{extract_chroma, CHROMA_MAX_HZ, CHROMA_MIN_HZ};
/// use stratum_live::features::spectrum::Spectrum;
///
/// let silent = vec![-120.0f32; 2048];
/// let chroma = extract_chroma(&Spectrum::new(&silent, 44100), CHROMA_MIN_HZ, CHROMA_MAX_HZ);
/// assert!(chroma.is_silent());
/// ```
pub fn extract_chroma(spectrum: &Spectrum<'_>, min_hz: f32, max_hz: f32) -> ChromaVector {
    let mut buckets = [0.0f32; 12];

    for i in spectrum.bin_range(min_hz, max_hz) {
        let magnitude = spectrum.linear(i);
        if magnitude <= LINEAR_FLOOR {
            continue;
        }
        if let Some(pc) = pitch_class(spectrum.freq(i)) {
            buckets[pc] += magnitude;
        }
    }

    ChromaVector::from_energies(buckets)
}
