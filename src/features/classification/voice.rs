//! Voice-rejection heuristics
//!
//! Speech and singing share several traits that instrumental tones rarely do:
//! energy concentrated in vocal-tract formant regions, pitch that wobbles from
//! frame to frame, and a noisy waveform in the speech band. Each check here is
//! independently disqualifying.

use serde::Serialize;

use crate::features::history::History;
use crate::features::pitch::PitchCandidate;
use crate::features::spectrum::Spectrum;

/// Formant regions (Hz) used for the energy check
pub const FORMANT_BANDS: [(f32, f32); 3] = [(300.0, 800.0), (1000.0, 1800.0), (2000.0, 3400.0)];

/// Share of total energy in the formant bands above which a frame is voice-like
pub const FORMANT_ENERGY_SHARE: f32 = 0.4;

/// Mean frame-to-frame pitch movement (semitones) above which a frame is voice-like
pub const VIBRATO_SEMITONES: f32 = 0.5;

/// Centroid range (Hz) treated as the speech band
pub const SPEECH_CENTROID_HZ: (f32, f32) = (150.0, 1200.0);

/// Which heuristic rejected a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoiceRejection {
    /// Too much energy in the formant bands
    FormantEnergy,
    /// Pitch moves too much between frames
    Vibrato,
    /// Speech-band centroid with a noisy waveform
    SpeechBand,
}

/// Fraction of total spectral energy inside [`FORMANT_BANDS`]
pub fn formant_energy_share(spectrum: &Spectrum<'_>) -> f32 {
    let total: f32 = (0..spectrum.len())
        .map(|i| {
            let m = spectrum.linear(i);
            m * m
        })
        .sum();
    if total <= f32::EPSILON {
        return 0.0;
    }
    let formant: f32 = FORMANT_BANDS
        .iter()
        .map(|&(low, high)| spectrum.band_energy(low, high))
        .sum();
    (formant / total).clamp(0.0, 1.0)
}

/// Mean absolute semitone change between consecutive pitch samples
///
/// Returns 0.0 with fewer than two samples.
pub fn mean_semitone_change(history: &History<PitchCandidate>) -> f32 {
    if history.len() < 2 {
        return 0.0;
    }
    let freqs: Vec<f32> = history.iter().map(|c| c.frequency).collect();
    let changes: Vec<f32> = freqs
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (12.0 * (w[1] / w[0]).log2()).abs())
        .filter(|c| c.is_finite())
        .collect();
    if changes.is_empty() {
        return 0.0;
    }
    changes.iter().sum::<f32>() / changes.len() as f32
}

/// Run the three checks in order; the first that fires is reported
pub fn detect_voice(
    spectrum: &Spectrum<'_>,
    pitch_history: &History<PitchCandidate>,
    centroid_hz: f32,
    zero_crossing_rate: f32,
    zero_crossing_threshold: f32,
) -> Option<VoiceRejection> {
    if formant_energy_share(spectrum) > FORMANT_ENERGY_SHARE {
        return Some(VoiceRejection::FormantEnergy);
    }

    if mean_semitone_change(pitch_history) > VIBRATO_SEMITONES {
        return Some(VoiceRejection::Vibrato);
    }

    let (low, high) = SPEECH_CENTROID_HZ;
    if (low..=high).contains(&centroid_hz) && zero_crossing_rate > zero_crossing_threshold {
        return Some(VoiceRejection::SpeechBand);
    }

    None
}
