//! Pitch estimation
//!
//! Produces a ranked list of concurrent pitch candidates per frame by merging:
//! - a monophonic autocorrelation estimate (time domain)
//! - spectral peaks (frequency domain)
//!
//! Spectral peaks within [`DUPLICATE_TOLERANCE_HZ`] of an already accepted
//! frequency are dropped, so a fundamental found by both methods appears once.

pub mod autocorrelation;
pub mod spectral_peaks;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::features::spectrum::Spectrum;
use autocorrelation::AutocorrelationParams;

/// Maximum number of ranked candidates per frame
pub const MAX_CANDIDATES: usize = 6;

/// Candidates closer than this are treated as the same pitch (Hz)
pub const DUPLICATE_TOLERANCE_HZ: f32 = 10.0;

/// Pitch candidate with confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchCandidate {
    /// Frequency in Hz
    pub frequency: f32,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,

    /// Timestamp of the frame it came from, in milliseconds
    pub timestamp_ms: f64,
}

/// Per-session pitch estimator (stateless between frames)
#[derive(Debug, Clone)]
pub struct PitchEstimator {
    params: AutocorrelationParams,
    peak_min_hz: f32,
    peak_max_hz: f32,
}

impl PitchEstimator {
    /// Build an estimator for a session configuration
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            params: AutocorrelationParams {
                sample_rate: config.sample_rate,
                min_pitch_hz: config.min_pitch_hz,
                min_detect_hz: config.min_detect_hz,
                max_detect_hz: config.max_detect_hz,
            },
            peak_min_hz: config.min_pitch_hz,
            peak_max_hz: config.max_detect_hz,
        }
    }

    /// Ranked pitch candidates for one frame, highest confidence first
    pub fn estimate(
        &self,
        samples: &[f32],
        spectrum: &Spectrum<'_>,
        timestamp_ms: f64,
    ) -> Vec<PitchCandidate> {
        let monophonic = autocorrelation::estimate_pitch(samples, &self.params);
        let peaks =
            spectral_peaks::find_spectral_peaks(spectrum, self.peak_min_hz, self.peak_max_hz);

        let candidates = merge_candidates(
            monophonic,
            peaks.iter().map(|p| (p.frequency, p.confidence)),
            timestamp_ms,
        );

        log::trace!(
            "Pitch: mono={:?}, {} spectral peaks, {} candidates",
            monophonic,
            peaks.len(),
            candidates.len()
        );
        candidates
    }
}

/// Merge a monophonic estimate with spectral peaks
///
/// The monophonic estimate is considered first; each spectral peak is kept
/// only if no kept candidate lies within [`DUPLICATE_TOLERANCE_HZ`]. The result
/// is sorted by confidence (descending) and capped at [`MAX_CANDIDATES`].
pub fn merge_candidates(
    monophonic: Option<(f32, f32)>,
    peaks: impl IntoIterator<Item = (f32, f32)>,
    timestamp_ms: f64,
) -> Vec<PitchCandidate> {
    let mut merged: Vec<PitchCandidate> = Vec::with_capacity(MAX_CANDIDATES + 2);

    for (frequency, confidence) in monophonic.into_iter().chain(peaks) {
        if !frequency.is_finite() || frequency <= 0.0 {
            continue;
        }
        let duplicate = merged
            .iter()
            .any(|c| (c.frequency - frequency).abs() < DUPLICATE_TOLERANCE_HZ);
        if !duplicate {
            merged.push(PitchCandidate {
                frequency,
                confidence: confidence.clamp(0.0, 1.0),
                timestamp_ms,
            });
        }
    }

    merged.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(MAX_CANDIDATES);
    merged
}
