//! Onset-driven tempo and beat-phase tracking
//!
//! A beat is registered when the onset strength exceeds 0.6 and at least
//! 200 ms have passed since the previous beat. Once four beats are stored,
//! every new beat contributes `60000 / mean_interval` to a short tempo
//! history whose mean is the reported tempo.

use super::{RhythmState, BEATS_PER_BAR, DEFAULT_TEMPO_BPM};
use crate::features::history::History;
use crate::features::onset::EnergyOnsetDetector;

/// Capacity of the beat-timestamp history
pub const BEAT_HISTORY: usize = 8;

/// Capacity of the tempo-estimate history
pub const TEMPO_HISTORY: usize = 5;

/// Onset strength needed to register a beat
pub const BEAT_ONSET_THRESHOLD: f32 = 0.6;

/// Refractory window between registered beats (ms)
pub const MIN_BEAT_SPACING_MS: f64 = 200.0;

/// Beats needed before a tempo is estimated
pub const MIN_BEATS_FOR_TEMPO: usize = 4;

/// Window after a beat during which frames count as on the beat (ms)
pub const ON_BEAT_WINDOW_MS: f64 = 100.0;

/// Reported tempo range (BPM)
pub const TEMPO_RANGE_BPM: (f32, f32) = (60.0, 200.0);

/// Stateful rhythm tracker, one per session
#[derive(Debug, Clone)]
pub struct RhythmAnalyzer {
    onsets: EnergyOnsetDetector,
    beats: History<f64>,
    tempos: History<f32>,
}

impl RhythmAnalyzer {
    /// Create a tracker with empty histories
    pub fn new() -> Self {
        Self {
            onsets: EnergyOnsetDetector::new(),
            beats: History::new(BEAT_HISTORY),
            tempos: History::new(TEMPO_HISTORY),
        }
    }

    /// Feed one frame's amplitude (dB) at `timestamp_ms`
    pub fn update(&mut self, amplitude_db: f32, timestamp_ms: f64) -> RhythmState {
        let strength = self.onsets.push(amplitude_db);

        if strength > BEAT_ONSET_THRESHOLD {
            let spaced = self
                .beats
                .latest()
                .map_or(true, |&last| timestamp_ms - last >= MIN_BEAT_SPACING_MS);
            if spaced {
                self.register_beat(timestamp_ms);
            }
        }

        self.state(strength, timestamp_ms)
    }

    /// Register a beat at `timestamp_ms` directly
    ///
    /// Bypasses onset detection; used by hosts with an external beat source
    /// (tap tempo, MIDI clock).
    pub fn register_beat(&mut self, timestamp_ms: f64) {
        self.beats.push(timestamp_ms);

        if self.beats.len() >= MIN_BEATS_FOR_TEMPO {
            if let Some(interval) = self.mean_interval() {
                let bpm = (60_000.0 / interval) as f32;
                self.tempos.push(bpm);
                log::debug!(
                    "Beat at {:.0} ms: interval {:.1} ms -> {:.1} BPM (smoothed {:.1})",
                    timestamp_ms,
                    interval,
                    bpm,
                    self.tempo_bpm()
                );
            }
        } else {
            log::debug!("Beat at {:.0} ms ({} registered)", timestamp_ms, self.beats.len());
        }
    }

    /// Current tempo estimate in BPM
    pub fn tempo_bpm(&self) -> f32 {
        if self.beats.len() < MIN_BEATS_FOR_TEMPO || self.tempos.is_empty() {
            return DEFAULT_TEMPO_BPM;
        }
        let (low, high) = TEMPO_RANGE_BPM;
        self.tempos.mean().clamp(low, high)
    }

    /// Registered beat timestamps, oldest first
    pub fn beats(&self) -> &History<f64> {
        &self.beats
    }

    /// Clear every history
    pub fn reset(&mut self) {
        self.onsets.reset();
        self.beats.clear();
        self.tempos.clear();
    }

    /// Mean spacing of the stored beats, `None` for degenerate spacing
    fn mean_interval(&self) -> Option<f64> {
        let first = *self.beats.iter().next()?;
        let last = *self.beats.latest()?;
        let gaps = self.beats.len().checked_sub(1).filter(|&n| n > 0)?;
        let mean = (last - first) / gaps as f64;
        (mean.is_finite() && mean > 0.0).then_some(mean)
    }

    fn state(&self, strength: f32, timestamp_ms: f64) -> RhythmState {
        let tempo_bpm = self.tempo_bpm();
        let Some(&last_beat) = self.beats.latest() else {
            return RhythmState {
                tempo_bpm,
                beat_strength: strength,
                ..RhythmState::default()
            };
        };

        let since_beat = (timestamp_ms - last_beat).max(0.0);
        let beat_interval = 60_000.0 / tempo_bpm as f64;
        let phase = (since_beat / beat_interval).floor() as u32 + 1;

        RhythmState {
            tempo_bpm,
            beat_strength: strength,
            current_beat: phase.clamp(1, BEATS_PER_BAR),
            is_on_beat: since_beat < ON_BEAT_WINDOW_MS,
        }
    }
}

impl Default for RhythmAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quiet frames every 50 ms with a 40 dB click every `period_ms`
    fn click_train(analyzer: &mut RhythmAnalyzer, period_ms: u32, clicks: u32) -> Vec<RhythmState> {
        let mut states = Vec::new();
        let frames = clicks * period_ms / 50;
        for k in 0..frames {
            let t = (k * 50) as f64;
            let level = if k > 0 && (k * 50) % period_ms == 0 { -20.0 } else { -60.0 };
            states.push(analyzer.update(level, t));
        }
        states
    }

    #[test]
    fn test_default_tempo_before_four_beats() {
        let mut analyzer = RhythmAnalyzer::new();
        let state = analyzer.update(-60.0, 0.0);
        assert_eq!(state.tempo_bpm, DEFAULT_TEMPO_BPM);
        assert_eq!(state.current_beat, 1);
        assert!(!state.is_on_beat);

        for k in 0..3 {
            analyzer.register_beat(k as f64 * 500.0);
        }
        assert_eq!(analyzer.tempo_bpm(), DEFAULT_TEMPO_BPM);
    }

    #[test]
    fn test_four_beats_500ms_is_120_bpm() {
        let mut analyzer = RhythmAnalyzer::new();
        for k in 0..4 {
            analyzer.register_beat(1000.0 + k as f64 * 500.0);
        }
        assert!((analyzer.tempo_bpm() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_click_train_converges() {
        let mut analyzer = RhythmAnalyzer::new();
        let states = click_train(&mut analyzer, 400, 12);
        let last = states.last().unwrap();
        assert!((last.tempo_bpm - 150.0).abs() < 0.5, "tempo {}", last.tempo_bpm);
        assert_eq!(analyzer.beats().len(), BEAT_HISTORY);
    }

    #[test]
    fn test_on_beat_and_phase() {
        let mut analyzer = RhythmAnalyzer::new();
        for k in 0..4 {
            analyzer.register_beat(k as f64 * 500.0);
        }
        // last beat at 1500 ms, 500 ms per beat
        let on = analyzer.update(-60.0, 1550.0);
        assert!(on.is_on_beat);
        assert_eq!(on.current_beat, 1);

        let later = analyzer.update(-60.0, 2600.0);
        assert!(!later.is_on_beat);
        assert_eq!(later.current_beat, 3);

        let long_after = analyzer.update(-60.0, 9000.0);
        assert_eq!(long_after.current_beat, BEATS_PER_BAR);
    }

    #[test]
    fn test_refractory_window() {
        let mut analyzer = RhythmAnalyzer::new();
        analyzer.update(-60.0, 0.0);
        analyzer.update(-60.0, 10.0);
        analyzer.update(-20.0, 20.0);
        // second strong rise 100 ms later is ignored
        analyzer.update(-60.0, 60.0);
        analyzer.update(-60.0, 90.0);
        let state = analyzer.update(-20.0, 120.0);
        assert!(state.beat_strength > BEAT_ONSET_THRESHOLD);
        assert_eq!(analyzer.beats().len(), 1);
    }

    #[test]
    fn test_tempo_clamped() {
        let mut analyzer = RhythmAnalyzer::new();
        for k in 0..4 {
            analyzer.register_beat(k as f64 * 2000.0);
        }
        assert_eq!(analyzer.tempo_bpm(), 60.0);
    }

    #[test]
    fn test_reset() {
        let mut analyzer = RhythmAnalyzer::new();
        click_train(&mut analyzer, 500, 6);
        analyzer.reset();
        assert!(analyzer.beats().is_empty());
        assert_eq!(analyzer.tempo_bpm(), DEFAULT_TEMPO_BPM);
    }
}
