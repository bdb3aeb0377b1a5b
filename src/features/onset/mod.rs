//! Onset detection modules
//!
//! Frame-rate onset strength from the amplitude envelope:
//! - Energy step (accelerating rise in dB)

pub mod energy_flux;

pub use energy_flux::{onset_strength, EnergyOnsetDetector};
