//! Per-frame analysis pipeline
//!
//! [`LiveAnalyzer`] owns every piece of cross-frame state for one session and
//! runs the stages in a fixed order on each frame:
//!
//! ```text
//! level → noise gate → pitch candidates → classifier
//!       → (musical only) chroma → key → melody/harmony
//! level → rhythm (every frame)
//! ```
//!
//! Processing never fails: empty or non-finite input degrades to an idle
//! frame with no pitch, no chroma and harmony type `None`.

use std::borrow::Cow;

use super::result::{FrameAnalysis, Key, ProcessingState};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::beat_tracking::RhythmAnalyzer;
use crate::features::chroma::extractor::{extract_chroma, CHROMA_MAX_HZ, CHROMA_MIN_HZ};
use crate::features::classification::HarmonicClassifier;
use crate::features::key::{KeyEstimate, KeyEstimator};
use crate::features::pitch::PitchEstimator;
use crate::features::segmentation::{HarmonyAnalysis, MelodyHarmonySegmenter};
use crate::features::spectrum::Spectrum;
use crate::io::frame::AudioFrame;
use crate::preprocessing::level::rms_db;
use crate::preprocessing::{NoiseGate, NoiseGateConfig, NoiseGateState};

/// Live analysis session
///
/// # Example
///
/// ```
/// use stratum_live::{AnalysisConfig, AudioFrame, LiveAnalyzer, ProcessingState};
///
/// let mut analyzer = LiveAnalyzer::new(AnalysisConfig::default())?;
/// let frame = AudioFrame::new(vec![0.0; 2048], vec![-120.0; 2048], 0.0);
/// let analysis = analyzer.process(&frame);
/// assert_eq!(analysis.state, ProcessingState::Idle);
/// assert!(!analysis.noise_gate_open);
/// # Ok::<(), stratum_live::AnalysisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LiveAnalyzer {
    config: AnalysisConfig,
    gate: NoiseGate,
    pitch: PitchEstimator,
    classifier: HarmonicClassifier,
    key: KeyEstimator,
    rhythm: RhythmAnalyzer,
    segmenter: MelodyHarmonySegmenter,
    last_state: ProcessingState,
    frames_processed: u64,
}

impl LiveAnalyzer {
    /// Create an analyzer for one session
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ConfigError` if the configuration is invalid.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        log::debug!(
            "Live analyzer: {} Hz, fft={}, window={}, polyphonic={}",
            config.sample_rate,
            config.fft_size,
            config.window_size,
            config.polyphonic
        );

        Ok(Self {
            gate: NoiseGate::new(NoiseGateConfig::from(&config)),
            pitch: PitchEstimator::new(&config),
            classifier: HarmonicClassifier::new(&config),
            key: KeyEstimator::new(),
            rhythm: RhythmAnalyzer::new(),
            segmenter: MelodyHarmonySegmenter::new(config.polyphonic),
            last_state: ProcessingState::Idle,
            frames_processed: 0,
            config,
        })
    }

    /// Analyze one frame
    pub fn process(&mut self, frame: &AudioFrame) -> FrameAnalysis {
        let timestamp_ms = frame.timestamp_ms;
        self.frames_processed += 1;

        let samples = finite_samples(&frame.samples);
        let amplitude_db = rms_db(&samples);

        // floor tracking and onset history run on every frame, gated or not
        let gate_open = self.gate.update(amplitude_db);
        let rhythm = self.rhythm.update(amplitude_db, timestamp_ms);

        let base = FrameAnalysis {
            state: ProcessingState::Idle,
            primary_pitch: None,
            chroma: None,
            amplitude_db,
            noise_gate_open: gate_open,
            harmony: HarmonyAnalysis::none(rhythm),
            key: self.key.current(),
            rhythm,
            features: None,
            timestamp_ms,
        };

        if frame.is_degenerate() || !gate_open {
            return self.finish(base);
        }

        let spectrum = Spectrum::new(&frame.spectrum_db, self.config.sample_rate);
        let candidates = self.pitch.estimate(&samples, &spectrum, timestamp_ms);
        let Some(primary) = candidates.first().copied() else {
            return self.finish(FrameAnalysis {
                state: ProcessingState::Processing,
                ..base
            });
        };

        let features = self.classifier.classify(&primary, &samples, &spectrum);
        if !features.is_musical {
            return self.finish(FrameAnalysis {
                state: ProcessingState::NoiseDetected,
                primary_pitch: Some(primary),
                features: Some(features),
                ..base
            });
        }

        let chroma = extract_chroma(&spectrum, CHROMA_MIN_HZ, CHROMA_MAX_HZ);
        let key = self.key.update(&chroma).or_else(|| self.key.current());
        let harmony = self.segmenter.segment(&candidates, rhythm, timestamp_ms);

        self.finish(FrameAnalysis {
            state: ProcessingState::MusicalInput,
            primary_pitch: Some(primary),
            chroma: Some(chroma),
            harmony,
            key,
            features: Some(features),
            ..base
        })
    }

    /// Force the reported key, or release the override with `None`
    ///
    /// Releasing clears the key history, so estimation restarts from scratch.
    pub fn set_key_override(&mut self, key: Option<Key>) {
        self.key.set_override(key);
    }

    /// Active key override, if any
    pub fn key_override(&self) -> Option<Key> {
        self.key.override_key()
    }

    /// Smoothed key without processing a frame
    pub fn current_key(&self) -> Option<KeyEstimate> {
        self.key.current()
    }

    /// Current tempo estimate in BPM
    pub fn tempo_bpm(&self) -> f32 {
        self.rhythm.tempo_bpm()
    }

    /// Noise gate after the last frame
    pub fn noise_gate_state(&self) -> NoiseGateState {
        self.gate.state()
    }

    /// Session configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Frames processed since creation or the last reset
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Key estimator (history inspection)
    pub fn key_estimator(&self) -> &KeyEstimator {
        &self.key
    }

    /// Return to the initial state: floor, histories, debounce memories and
    /// key override are all cleared
    pub fn reset(&mut self) {
        log::debug!("Resetting analyzer after {} frames", self.frames_processed);
        self.gate.reset();
        self.classifier.reset();
        self.key.reset();
        self.rhythm.reset();
        self.segmenter.reset();
        self.last_state = ProcessingState::Idle;
        self.frames_processed = 0;
    }

    /// Rhythm tracker (beat history inspection)
    pub fn rhythm(&self) -> &RhythmAnalyzer {
        &self.rhythm
    }

    fn finish(&mut self, analysis: FrameAnalysis) -> FrameAnalysis {
        if analysis.state != self.last_state {
            log::debug!(
                "State {:?} -> {:?} at {:.0} ms ({:.1} dB)",
                self.last_state,
                analysis.state,
                analysis.timestamp_ms,
                analysis.amplitude_db
            );
            self.last_state = analysis.state;
        }
        log::trace!(
            "Frame {:.0} ms: {:?}, pitch={:?}, harmony={:?}",
            analysis.timestamp_ms,
            analysis.state,
            analysis.primary_pitch.map(|p| p.frequency),
            analysis.harmony.harmony_type
        );
        analysis
    }
}

/// Samples with non-finite values replaced by silence
fn finite_samples(samples: &[f32]) -> Cow<'_, [f32]> {
    if samples.iter().all(|x| x.is_finite()) {
        Cow::Borrowed(samples)
    } else {
        Cow::Owned(
            samples
                .iter()
                .map(|&x| if x.is_finite() { x } else { 0.0 })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::Mode;
    use crate::features::segmentation::HarmonyType;
    use crate::io::spectrum::magnitude_spectrum_db;

    fn sine(freq: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / 44100.0).sin())
            .collect()
    }

    /// Frame the way a capture host would: spectrum over the full block,
    /// newest `window_size` samples in the time domain
    fn tone_frame(config: &AnalysisConfig, freq: f32, timestamp_ms: f64) -> AudioFrame {
        let block = sine(freq, 0.5, config.fft_size);
        let spectrum_db = magnitude_spectrum_db(&block, config.fft_size);
        let samples = block[config.fft_size - config.window_size..].to_vec();
        AudioFrame::new(samples, spectrum_db, timestamp_ms)
    }

    fn silent_frame(timestamp_ms: f64) -> AudioFrame {
        AudioFrame::new(vec![0.0; 2048], vec![-120.0; 2048], timestamp_ms)
    }

    #[test]
    fn test_silence_is_idle() {
        let mut analyzer = LiveAnalyzer::new(AnalysisConfig::default()).unwrap();
        for k in 0..10 {
            let analysis = analyzer.process(&silent_frame(k as f64 * 16.0));
            assert_eq!(analysis.state, ProcessingState::Idle);
            assert!(!analysis.noise_gate_open);
            assert_eq!(analysis.harmony.harmony_type, HarmonyType::None);
            assert!(analysis.harmony.melody_notes.is_empty());
            assert!(analysis.harmony.chord_notes.is_empty());
            assert!(analysis.primary_pitch.is_none());
            assert!(analysis.chroma.is_none());
            assert_eq!(analysis.amplitude_db, -90.0);
        }
    }

    #[test]
    fn test_degenerate_frames() {
        let mut analyzer = LiveAnalyzer::new(AnalysisConfig::default()).unwrap();
        let empty = AudioFrame::new(Vec::new(), Vec::new(), 0.0);
        assert_eq!(analyzer.process(&empty).state, ProcessingState::Idle);

        let mut samples = sine(220.0, 0.5, 2048);
        samples[10] = f32::NAN;
        samples[11] = f32::INFINITY;
        let frame = AudioFrame::new(samples, Vec::new(), 16.0);
        let analysis = analyzer.process(&frame);
        assert_eq!(analysis.state, ProcessingState::Idle);
        assert!(analysis.amplitude_db.is_finite());
    }

    #[test]
    fn test_steady_tone_becomes_musical() {
        let config = AnalysisConfig::default();
        let mut analyzer = LiveAnalyzer::new(config.clone()).unwrap();

        let mut last = None;
        for k in 0..20 {
            last = Some(analyzer.process(&tone_frame(&config, 220.0, k as f64 * 16.0)));
        }
        let last = last.unwrap();
        assert!(last.noise_gate_open);
        assert_eq!(last.state, ProcessingState::MusicalInput);
        let pitch = last.primary_pitch.unwrap();
        assert!((pitch.frequency - 220.0).abs() < 3.0, "pitch {}", pitch.frequency);
        assert_eq!(last.harmony.harmony_type, HarmonyType::Melody);
        assert_eq!(last.harmony.melody_notes, vec!["A"]);

        let chroma = last.chroma.unwrap();
        assert_eq!(chroma.dominant, 9);
        assert!(last.key.is_some());
    }

    #[test]
    fn test_key_override() {
        let config = AnalysisConfig::default();
        let mut analyzer = LiveAnalyzer::new(config.clone()).unwrap();
        for k in 0..12 {
            analyzer.process(&tone_frame(&config, 220.0, k as f64 * 16.0));
        }
        assert!(!analyzer.key_estimator().history().is_empty());

        let forced = Key::new(2, Mode::Minor);
        analyzer.set_key_override(Some(forced));
        assert_eq!(analyzer.key_override(), Some(forced));
        let analysis = analyzer.process(&tone_frame(&config, 220.0, 200.0));
        let key = analysis.key.unwrap();
        assert_eq!(key.key, forced);
        assert_eq!(key.confidence, 1.0);

        analyzer.set_key_override(None);
        assert!(analyzer.key_estimator().history().is_empty());
        assert!(analyzer.current_key().is_none());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let config = AnalysisConfig::default();
        let mut analyzer = LiveAnalyzer::new(config.clone()).unwrap();
        for k in 0..12 {
            analyzer.process(&tone_frame(&config, 220.0, k as f64 * 16.0));
        }
        analyzer.set_key_override(Some(Key::Major(0)));
        analyzer.reset();

        assert_eq!(analyzer.frames_processed(), 0);
        assert!(analyzer.key_override().is_none());
        assert!(analyzer.key_estimator().history().is_empty());
        assert!(analyzer.rhythm().beats().is_empty());
        let gate = analyzer.noise_gate_state();
        assert_eq!(gate.noise_floor_db, -90.0);
        assert!(!gate.is_open);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            fft_size: 1000,
            ..AnalysisConfig::default()
        };
        assert!(LiveAnalyzer::new(config).is_err());
    }
}
