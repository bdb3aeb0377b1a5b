//! Feature extraction modules
//!
//! This module contains all per-frame feature extraction:
//! - Spectrum access, note naming and rolling histories
//! - Pitch candidates (autocorrelation + spectral peaks)
//! - Musical/noise classification with voice rejection
//! - Chroma extraction
//! - Key detection with smoothing
//! - Onset detection and beat tracking
//! - Melody/harmony segmentation

pub mod beat_tracking;
pub mod chroma;
pub mod classification;
pub mod history;
pub mod key;
pub mod notes;
pub mod onset;
pub mod pitch;
pub mod segmentation;
pub mod spectrum;
