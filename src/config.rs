//! Configuration parameters for live analysis
//!
//! All values are fixed for the lifetime of a [`crate::LiveAnalyzer`]. To change
//! them, build a new analyzer.
//!
//! Configurations can be written as TOML; every field is optional and falls back
//! to its default:
//!
//! ```
//! use stratum_live::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_toml_str("polyphonic = true\ngate_min_db = -60.0")?;
//! assert!(config.polyphonic);
//! assert_eq!(config.sample_rate, 44100);
//! # Ok::<(), stratum_live::AnalysisError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Session format
    /// Sample rate in Hz (default: 44100)
    pub sample_rate: u32,

    /// FFT size used to produce the magnitude spectrum (default: 4096)
    ///
    /// The spectrum handed to the analyzer has `fft_size / 2` bins.
    pub fft_size: usize,

    /// Analysis window length in samples (default: 2048)
    pub window_size: usize,

    // Pitch ranges
    /// Lowest pitch the autocorrelation searches for (default: 80.0 Hz)
    pub min_pitch_hz: f32,

    /// Upper edge of the band used for harmonic-ratio energy (default: 1100.0 Hz)
    pub max_pitch_hz: f32,

    /// Lowest accepted monophonic estimate (default: 50.0 Hz)
    pub min_detect_hz: f32,

    /// Highest accepted monophonic estimate (default: 2000.0 Hz)
    pub max_detect_hz: f32,

    // Noise gate
    /// Absolute floor of the gate threshold in dB (default: -65.0)
    pub gate_min_db: f32,

    /// Ceiling of the adaptive gate threshold in dB (default: -20.0)
    pub gate_max_db: f32,

    /// Margin above the tracked noise floor in dB (default: 8.0)
    pub gate_margin_db: f32,

    /// Noise floor EMA decay per frame (default: 0.001)
    pub gate_decay: f32,

    // Classifier thresholds
    /// Smoothed harmonic ratio needed to vote musical (default: 0.18)
    pub harmonic_ratio_threshold: f32,

    /// Smoothed pitch stability needed to vote musical (default: 0.35)
    pub stability_threshold: f32,

    /// Lower edge of the musical centroid range (default: 150.0 Hz)
    pub centroid_min_hz: f32,

    /// Upper edge of the musical centroid range (default: 4186.0 Hz, C8)
    pub centroid_max_hz: f32,

    /// Zero-crossing rate above which a frame is considered noisy (default: 0.12)
    pub zero_crossing_threshold: f32,

    // Segmentation
    /// Treat every confident candidate set as a chord (default: false)
    pub polyphonic: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            fft_size: 4096,
            window_size: 2048,
            min_pitch_hz: 80.0,
            max_pitch_hz: 1100.0,
            min_detect_hz: 50.0,
            max_detect_hz: 2000.0,
            gate_min_db: -65.0,
            gate_max_db: -20.0,
            gate_margin_db: 8.0,
            gate_decay: 0.001,
            harmonic_ratio_threshold: 0.18,
            stability_threshold: 0.35,
            centroid_min_hz: 150.0,
            centroid_max_hz: 4186.0,
            zero_crossing_threshold: 0.12,
            polyphonic: false,
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        log::debug!("Loading analysis config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Frequency spacing of one spectrum bin in Hz
    pub fn bin_hz(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size as f32
    }

    /// Check that the parameters describe a usable session
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.sample_rate == 0 {
            return Err(AnalysisError::ConfigError(
                "sample_rate must be > 0".to_string(),
            ));
        }

        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(AnalysisError::ConfigError(format!(
                "fft_size must be a power of two, got {}",
                self.fft_size
            )));
        }

        if self.window_size == 0 || self.window_size > self.fft_size {
            return Err(AnalysisError::ConfigError(format!(
                "window_size must be in 1..={}, got {}",
                self.fft_size, self.window_size
            )));
        }

        check_range("pitch", self.min_pitch_hz, self.max_pitch_hz)?;
        check_range("detection", self.min_detect_hz, self.max_detect_hz)?;
        check_range("centroid", self.centroid_min_hz, self.centroid_max_hz)?;

        if self.gate_min_db >= self.gate_max_db {
            return Err(AnalysisError::ConfigError(format!(
                "gate_min_db ({}) must be below gate_max_db ({})",
                self.gate_min_db, self.gate_max_db
            )));
        }

        if !(0.0..=1.0).contains(&self.gate_decay) {
            return Err(AnalysisError::ConfigError(format!(
                "gate_decay must be in [0, 1], got {}",
                self.gate_decay
            )));
        }

        let nyquist = self.sample_rate as f32 / 2.0;
        if self.max_detect_hz >= nyquist {
            return Err(AnalysisError::ConfigError(format!(
                "max_detect_hz ({}) must be below Nyquist ({})",
                self.max_detect_hz, nyquist
            )));
        }

        Ok(())
    }
}

fn check_range(name: &str, low: f32, high: f32) -> Result<(), AnalysisError> {
    if !(low.is_finite() && high.is_finite()) || low <= 0.0 || low >= high {
        return Err(AnalysisError::ConfigError(format!(
            "invalid {} range: [{}, {}]",
            name, low, high
        )));
    }
    Ok(())
}
