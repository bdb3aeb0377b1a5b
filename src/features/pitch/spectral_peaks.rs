//! Spectral peak picking for concurrent pitches
//!
//! Finds local maxima of the dB spectrum inside a frequency band and scores
//! each by how far it stands above its taller neighbour.

use super::autocorrelation::parabolic_offset;
use crate::features::spectrum::Spectrum;

/// Peaks quieter than this are ignored (dB)
pub const PEAK_MIN_DB: f32 = -40.0;

/// Peaks scoring at or below this confidence are dropped
pub const MIN_PEAK_CONFIDENCE: f32 = 0.2;

/// Maximum number of peaks returned
pub const MAX_PEAKS: usize = 8;

/// A spectral peak: interpolated frequency and confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Peak frequency in Hz
    pub frequency: f32,
    /// Prominence-derived confidence (0.0-1.0)
    pub confidence: f32,
}

/// Confidence of a peak with the given prominence in dB
///
/// `clamp((prominence + 20) / 30, 0, 1)`
#[inline]
pub fn prominence_confidence(prominence_db: f32) -> f32 {
    ((prominence_db + 20.0) / 30.0).clamp(0.0, 1.0)
}

/// Find up to [`MAX_PEAKS`] peaks within `[min_hz, max_hz]`, strongest first
pub fn find_spectral_peaks(spectrum: &Spectrum<'_>, min_hz: f32, max_hz: f32) -> Vec<SpectralPeak> {
    if spectrum.len() < 3 {
        return Vec::new();
    }

    let range = spectrum.bin_range(min_hz, max_hz);
    let start = range.start.max(1);
    let end = range.end.min(spectrum.len() - 1);

    let mut peaks = Vec::new();
    for i in start..end {
        let value = spectrum.db(i);
        if value <= PEAK_MIN_DB {
            continue;
        }

        let left = spectrum.db(i - 1);
        let right = spectrum.db(i + 1);
        if !(value > left && value >= right) {
            continue;
        }

        let confidence = prominence_confidence(value - left.max(right));
        if confidence <= MIN_PEAK_CONFIDENCE {
            continue;
        }

        let offset = parabolic_offset(&[left, value, right], 1);
        peaks.push(SpectralPeak {
            frequency: (i as f32 + offset) * spectrum.bin_hz(),
            confidence,
        });
    }

    peaks.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    peaks.truncate(MAX_PEAKS);
    peaks
}
