//! Adaptive noise gate
//!
//! Tracks the ambient level with a slow exponential moving average and opens
//! when a frame rises clearly above it. The floor keeps adapting while the
//! gate is closed, so a room that gets louder raises the threshold with it.
//!
//! # Example
//!
//! ```
//! use stratum_live::preprocessing::noise_gate::NoiseGate;
//!
//! let mut gate = NoiseGate::default();
//! assert!(!gate.update(-90.0));
//! assert!(gate.update(-12.0));
//! ```

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::preprocessing::level::SILENCE_DB;

/// Noise gate configuration
#[derive(Debug, Clone, Copy)]
pub struct NoiseGateConfig {
    /// Lowest threshold the gate ever uses, in dB (default: -65.0)
    pub threshold_min_db: f32,

    /// Highest threshold the gate ever uses, in dB (default: -20.0)
    pub threshold_max_db: f32,

    /// Margin above the noise floor, in dB (default: 8.0)
    pub margin_db: f32,

    /// EMA decay applied each frame (default: 0.001)
    pub decay: f32,
}

impl Default for NoiseGateConfig {
    fn default() -> Self {
        Self {
            threshold_min_db: -65.0,
            threshold_max_db: -20.0,
            margin_db: 8.0,
            decay: 0.001,
        }
    }
}

impl From<&AnalysisConfig> for NoiseGateConfig {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            threshold_min_db: config.gate_min_db,
            threshold_max_db: config.gate_max_db,
            margin_db: config.gate_margin_db,
            decay: config.gate_decay,
        }
    }
}

/// Snapshot of the gate after a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseGateState {
    /// Tracked ambient level in dB
    pub noise_floor_db: f32,
    /// Whether the last frame passed the gate
    pub is_open: bool,
}

/// Adaptive noise gate, one per session
#[derive(Debug, Clone)]
pub struct NoiseGate {
    config: NoiseGateConfig,
    noise_floor_db: f32,
    is_open: bool,
}

impl NoiseGate {
    /// Create a gate whose floor starts at digital silence
    pub fn new(config: NoiseGateConfig) -> Self {
        Self {
            noise_floor_db: SILENCE_DB,
            is_open: false,
            config,
        }
    }

    /// Feed one frame level; returns whether the gate is open
    ///
    /// The floor update happens on every call, before the comparison.
    pub fn update(&mut self, amplitude_db: f32) -> bool {
        let level = if amplitude_db.is_finite() {
            amplitude_db
        } else {
            SILENCE_DB
        };

        let alpha = self.config.decay;
        self.noise_floor_db = self.noise_floor_db * (1.0 - alpha) + level * alpha;

        let open = level > self.threshold_db();
        if open != self.is_open {
            log::debug!(
                "Noise gate {} at {:.1} dB (floor {:.1} dB, threshold {:.1} dB)",
                if open { "opened" } else { "closed" },
                level,
                self.noise_floor_db,
                self.threshold_db()
            );
        }
        self.is_open = open;
        open
    }

    /// Current opening threshold in dB
    ///
    /// `max(noise_floor + margin, threshold_min_db)`, capped at
    /// `threshold_max_db` so a loud steady floor cannot hold the gate shut.
    pub fn threshold_db(&self) -> f32 {
        (self.noise_floor_db + self.config.margin_db)
            .max(self.config.threshold_min_db)
            .min(self.config.threshold_max_db)
    }

    /// Current state
    pub fn state(&self) -> NoiseGateState {
        NoiseGateState {
            noise_floor_db: self.noise_floor_db,
            is_open: self.is_open,
        }
    }

    /// Forget the tracked floor
    pub fn reset(&mut self) {
        self.noise_floor_db = SILENCE_DB;
        self.is_open = false;
    }
}

impl Default for NoiseGate {
    fn default() -> Self {
        Self::new(NoiseGateConfig::default())
    }
}
