//! Frame preprocessing
//!
//! - Level measurements (RMS in dB, zero-crossing rate)
//! - Adaptive noise gate

pub mod level;
pub mod noise_gate;

pub use noise_gate::{NoiseGate, NoiseGateConfig, NoiseGateState};
