//! Musical-versus-noise classification
//!
//! Decides whether a gated frame is musical input, using the frame's primary
//! (highest-confidence) pitch candidate as the presumed fundamental.
//!
//! # Signals
//!
//! Five independent votes, of which at least three must pass:
//! 1. Harmonic ratio (harmonics 1-5 vs in-band magnitude), mean of the last 6
//! 2. Pitch stability (`1 - σ/μ` over the last 12 pitches), mean of the last 8
//! 3. Spectral centroid inside the musical range
//! 4. Zero-crossing rate below the noise threshold
//! 5. Sustain: mean confidence of the last 6 pitches above 0.4
//!
//! Any of the [`voice`] checks vetoes the vote.

pub mod voice;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::features::history::History;
use crate::features::pitch::PitchCandidate;
use crate::features::spectrum::{Spectrum, LINEAR_FLOOR};
use crate::preprocessing::level::zero_crossing_rate;
pub use voice::VoiceRejection;

/// Capacity of the primary-pitch history
pub const PITCH_HISTORY: usize = 12;

/// Capacity of the harmonic-ratio history
pub const HARMONIC_HISTORY: usize = 6;

/// Capacity of the stability history
pub const STABILITY_HISTORY: usize = 8;

/// Number of recent pitches averaged for the sustain vote
pub const SUSTAIN_WINDOW: usize = 6;

/// Mean confidence needed for the sustain vote
pub const SUSTAIN_CONFIDENCE: f32 = 0.4;

/// Number of harmonics summed for the harmonic ratio
pub const HARMONICS: usize = 5;

/// Votes needed to call a frame musical
pub const MIN_VOTES: u8 = 3;

/// Feature snapshot of one classified frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HarmonicFeatures {
    /// Smoothed harmonic ratio (0.0-1.0)
    pub harmonic_ratio: f32,
    /// Smoothed pitch stability (0.0-1.0)
    pub stability: f32,
    /// Spectral centroid in Hz
    pub centroid_hz: f32,
    /// Zero-crossing rate (0.0-1.0)
    pub zero_crossing_rate: f32,
    /// Recent pitches are confidently held
    pub sustained: bool,
    /// Number of passing votes (0-5)
    pub votes: u8,
    /// Voice heuristic that vetoed the frame, if any
    pub rejection: Option<VoiceRejection>,
    /// Final decision
    pub is_musical: bool,
}

/// Stateful classifier, one per session
#[derive(Debug, Clone)]
pub struct HarmonicClassifier {
    pitch_history: History<PitchCandidate>,
    harmonic_history: History<f32>,
    stability_history: History<f32>,
    band: (f32, f32),
    harmonic_ratio_threshold: f32,
    stability_threshold: f32,
    centroid_range: (f32, f32),
    zero_crossing_threshold: f32,
}

impl HarmonicClassifier {
    /// Build a classifier for a session configuration
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            pitch_history: History::new(PITCH_HISTORY),
            harmonic_history: History::new(HARMONIC_HISTORY),
            stability_history: History::new(STABILITY_HISTORY),
            band: (config.min_pitch_hz, config.max_pitch_hz),
            harmonic_ratio_threshold: config.harmonic_ratio_threshold,
            stability_threshold: config.stability_threshold,
            centroid_range: (config.centroid_min_hz, config.centroid_max_hz),
            zero_crossing_threshold: config.zero_crossing_threshold,
        }
    }

    /// Classify one frame, updating the rolling histories
    pub fn classify(
        &mut self,
        primary: &PitchCandidate,
        samples: &[f32],
        spectrum: &Spectrum<'_>,
    ) -> HarmonicFeatures {
        self.pitch_history.push(*primary);

        self.harmonic_history
            .push(harmonic_ratio(spectrum, primary.frequency, self.band));
        let harmonic_ratio = self.harmonic_history.mean();

        self.stability_history
            .push(pitch_stability(&self.pitch_history));
        let stability = self.stability_history.mean();

        let centroid_hz = spectral_centroid(spectrum);
        let zcr = zero_crossing_rate(samples);

        let recent: Vec<f32> = self
            .pitch_history
            .recent(SUSTAIN_WINDOW)
            .map(|c| c.confidence)
            .collect();
        let sustained = !recent.is_empty()
            && recent.iter().sum::<f32>() / recent.len() as f32 > SUSTAIN_CONFIDENCE;

        let rejection = voice::detect_voice(
            spectrum,
            &self.pitch_history,
            centroid_hz,
            zcr,
            self.zero_crossing_threshold,
        );

        let (centroid_min, centroid_max) = self.centroid_range;
        let votes = [
            harmonic_ratio > self.harmonic_ratio_threshold,
            stability > self.stability_threshold,
            (centroid_min..=centroid_max).contains(&centroid_hz),
            zcr < self.zero_crossing_threshold,
            sustained,
        ]
        .iter()
        .filter(|&&v| v)
        .count() as u8;

        let is_musical = rejection.is_none() && votes >= MIN_VOTES;

        log::trace!(
            "Classifier: hr={:.3} stab={:.3} c={:.0}Hz zcr={:.3} sus={} votes={} reject={:?}",
            harmonic_ratio,
            stability,
            centroid_hz,
            zcr,
            sustained,
            votes,
            rejection
        );

        HarmonicFeatures {
            harmonic_ratio,
            stability,
            centroid_hz,
            zero_crossing_rate: zcr,
            sustained,
            votes,
            rejection,
            is_musical,
        }
    }

    /// Recent primary pitches, oldest first
    pub fn pitch_history(&self) -> &History<PitchCandidate> {
        &self.pitch_history
    }

    /// Clear every rolling history
    pub fn reset(&mut self) {
        self.pitch_history.clear();
        self.harmonic_history.clear();
        self.stability_history.clear();
    }
}

/// Linear magnitude at harmonics 1-5 of `fundamental` over total magnitude in `band`
///
/// Only the denominator is band-limited: every harmonic that falls inside the
/// spectrum is counted. Returns 0.0 when the band holds no energy or the
/// fundamental is unusable.
pub fn harmonic_ratio(spectrum: &Spectrum<'_>, fundamental: f32, band: (f32, f32)) -> f32 {
    if !fundamental.is_finite() || fundamental <= 0.0 {
        return 0.0;
    }
    let (low, high) = band;
    let total: f32 = spectrum.bin_range(low, high).map(|i| spectrum.linear(i)).sum();
    if total <= f32::EPSILON {
        return 0.0;
    }

    let harmonic: f32 = (1..=HARMONICS)
        .filter_map(|h| spectrum.nearest_bin(fundamental * h as f32))
        .map(|bin| spectrum.linear(bin))
        .sum();

    (harmonic / total).clamp(0.0, 1.0)
}

/// `1 - σ/μ` of the stored pitch frequencies, clamped to [0, 1]
pub fn pitch_stability(history: &History<PitchCandidate>) -> f32 {
    if history.is_empty() {
        return 0.0;
    }
    let n = history.len() as f32;
    let mean = history.iter().map(|c| c.frequency).sum::<f32>() / n;
    if mean <= f32::EPSILON {
        return 0.0;
    }
    let variance = history
        .iter()
        .map(|c| (c.frequency - mean).powi(2))
        .sum::<f32>()
        / n;
    (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
}

/// Magnitude-weighted mean frequency over bins above [`LINEAR_FLOOR`]
pub fn spectral_centroid(spectrum: &Spectrum<'_>) -> f32 {
    let mut weighted = 0.0f32;
    let mut total = 0.0f32;
    for i in 0..spectrum.len() {
        let m = spectrum.linear(i);
        if m > LINEAR_FLOOR {
            weighted += spectrum.freq(i) * m;
            total += m;
        }
    }
    if total <= f32::EPSILON {
        0.0
    } else {
        weighted / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::spectrum::MIN_DB;
    use crate::io::spectrum::magnitude_spectrum_db;

    fn candidate(frequency: f32, confidence: f32) -> PitchCandidate {
        PitchCandidate {
            frequency,
            confidence,
            timestamp_ms: 0.0,
        }
    }

    fn sine(freq: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / 44100.0).sin())
            .collect()
    }

    fn noise(len: usize, amplitude: f32) -> Vec<f32> {
        let mut state = 987654321u32;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                amplitude * ((state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0)
            })
            .collect()
    }

    #[test]
    fn test_pitch_stability() {
        let mut history = History::new(PITCH_HISTORY);
        assert_eq!(pitch_stability(&history), 0.0);
        for _ in 0..5 {
            history.push(candidate(220.0, 0.9));
        }
        assert!((pitch_stability(&history) - 1.0).abs() < 1e-6);

        history.push(candidate(2200.0, 0.9));
        assert!(pitch_stability(&history) < 0.5);
    }

    #[test]
    fn test_spectral_centroid() {
        let mut db = vec![MIN_DB; 2048];
        db[20] = 0.0;
        db[40] = 0.0;
        let spectrum = Spectrum::new(&db, 44100);
        let expected = 30.0 * spectrum.bin_hz();
        assert!((spectral_centroid(&spectrum) - expected).abs() < 0.5);

        let silent = vec![MIN_DB; 2048];
        assert_eq!(spectral_centroid(&Spectrum::new(&silent, 44100)), 0.0);
    }

    #[test]
    fn test_harmonic_ratio() {
        let mut db = vec![MIN_DB; 2048];
        // fundamental at bin 20 and its 2nd harmonic at bin 40, plus one stray bin
        db[20] = 0.0;
        db[40] = 0.0;
        db[33] = 0.0;
        let spectrum = Spectrum::new(&db, 44100);
        let f0 = 20.0 * spectrum.bin_hz();
        let ratio = harmonic_ratio(&spectrum, f0, (80.0, 1100.0));
        assert!((ratio - 2.0 / 3.0).abs() < 0.01, "ratio {:.3}", ratio);

        assert_eq!(harmonic_ratio(&spectrum, 0.0, (80.0, 1100.0)), 0.0);
        let silent = vec![f32::NEG_INFINITY; 2048];
        assert_eq!(harmonic_ratio(&Spectrum::new(&silent, 44100), f0, (80.0, 1100.0)), 0.0);
    }

    #[test]
    fn test_harmonic_ratio_counts_harmonics_above_band() {
        let mut db = vec![MIN_DB; 2048];
        let spectrum = Spectrum::new(&db, 44100);
        let f0 = 440.0;
        let (fundamental, stray, third) = (
            spectrum.nearest_bin(f0).unwrap(),
            spectrum.nearest_bin(600.0).unwrap(),
            spectrum.nearest_bin(3.0 * f0).unwrap(),
        );
        db[fundamental] = -20.0;
        db[stray] = -20.0;
        // 1320 Hz is above the band but still a harmonic
        db[third] = -26.0206;

        let spectrum = Spectrum::new(&db, 44100);
        let ratio = harmonic_ratio(&spectrum, f0, (80.0, 1100.0));
        assert!((ratio - 0.75).abs() < 0.01, "ratio {:.3}", ratio);
    }

    #[test]
    fn test_harmonic_ratio_window() {
        let config = AnalysisConfig::default();
        let mut classifier = HarmonicClassifier::new(&config);
        let mut db = vec![MIN_DB; 2048];
        db[20] = 0.0;
        let spectrum = Spectrum::new(&db, 44100);
        let on_peak = 20.0 * spectrum.bin_hz();
        // harmonics of bin 7 never reach bin 20
        let off_peak = 7.0 * spectrum.bin_hz();

        // five frames at ratio ~1, then ratio ~0
        let mut smoothed = Vec::new();
        for k in 0..9 {
            let f0 = if k < 5 { on_peak } else { off_peak };
            let features = classifier.classify(&candidate(f0, 0.9), &[0.0; 16], &spectrum);
            smoothed.push(features.harmonic_ratio);
        }

        let expected = [5.0 / 6.0, 4.0 / 6.0, 3.0 / 6.0, 2.0 / 6.0];
        for (push, want) in (6..=9).zip(expected) {
            let got = smoothed[push - 1];
            assert!((got - want).abs() < 1e-3, "push {}: {:.4} vs {:.4}", push, got, want);
        }
    }

    #[test]
    fn test_stability_and_pitch_windows() {
        let config = AnalysisConfig::default();
        let mut classifier = HarmonicClassifier::new(&config);
        let db = vec![MIN_DB; 2048];
        let spectrum = Spectrum::new(&db, 44100);

        // one 100 Hz outlier, then a held 200 Hz
        let mut smoothed = Vec::new();
        for k in 0..13 {
            let f0 = if k == 0 { 100.0 } else { 200.0 };
            let features = classifier.classify(&candidate(f0, 0.9), &[0.0; 16], &spectrum);
            smoothed.push(features.stability);
        }

        // mean of the last 8 per-frame stabilities; the outlier's frame leaves at push 9
        for (push, want) in [(6, 0.78515), (7, 0.78892), (8, 0.79326), (9, 0.77246)] {
            let got = smoothed[push - 1];
            assert!((got - want).abs() < 1e-4, "push {}: {:.5} vs {:.5}", push, got, want);
        }

        // the outlier leaves the 12-pitch window at push 13
        assert_eq!(classifier.pitch_history().len(), PITCH_HISTORY);
        assert!((smoothed[12] - 0.85161).abs() < 1e-4, "push 13: {:.5}", smoothed[12]);
    }

    #[test]
    fn test_steady_low_tone_is_musical() {
        let config = AnalysisConfig::default();
        let mut classifier = HarmonicClassifier::new(&config);
        let block = sine(220.0, 0.5, config.fft_size);
        let db = magnitude_spectrum_db(&block, config.fft_size);
        let spectrum = Spectrum::new(&db, config.sample_rate);
        let samples = &block[config.fft_size - config.window_size..];

        let mut features = None;
        for _ in 0..10 {
            features = Some(classifier.classify(&candidate(220.0, 0.9), samples, &spectrum));
        }
        let features = features.unwrap();
        assert_eq!(features.rejection, None);
        assert!(features.sustained);
        assert!(features.stability > 0.99);
        assert!(features.votes >= MIN_VOTES);
        assert!(features.is_musical);
    }

    #[test]
    fn test_white_noise_is_not_musical() {
        let config = AnalysisConfig::default();
        let mut classifier = HarmonicClassifier::new(&config);
        let block = noise(config.fft_size, 0.5);
        let db = magnitude_spectrum_db(&block, config.fft_size);
        let spectrum = Spectrum::new(&db, config.sample_rate);
        let samples = &block[config.fft_size - config.window_size..];

        let pitches = [120.0, 900.0, 310.0, 1500.0, 95.0, 640.0];
        let mut last = None;
        for (k, &f) in pitches.iter().enumerate() {
            let pitch = candidate(f, 0.25 + 0.01 * k as f32);
            last = Some(classifier.classify(&pitch, samples, &spectrum));
        }
        assert!(!last.unwrap().is_musical);
    }

    #[test]
    fn test_reset_clears_histories() {
        let config = AnalysisConfig::default();
        let mut classifier = HarmonicClassifier::new(&config);
        let db = vec![MIN_DB; 2048];
        let spectrum = Spectrum::new(&db, 44100);
        classifier.classify(&candidate(220.0, 0.9), &[0.0; 16], &spectrum);
        assert_eq!(classifier.pitch_history().len(), 1);
        classifier.reset();
        assert!(classifier.pitch_history().is_empty());
    }
}
