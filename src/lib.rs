//! # Stratum Live
//!
//! Frame-by-frame musical analysis for live, single-channel input: decides
//! whether a frame is music, estimates its pitches, splits them into melody
//! and chord tones, tracks tempo and beat phase, and infers the key.
//!
//! ## Features
//!
//! - **Noise Gate**: Adaptive ambient floor with a configurable opening threshold
//! - **Pitch**: Autocorrelation fundamental merged with spectral peaks
//! - **Classification**: Five-vote musical/noise decision with voice rejection
//! - **Key Detection**: Chroma-based Krumhansl-Schmuckler correlation with history smoothing
//! - **Rhythm**: Energy-step onsets, tempo from inter-beat intervals, 4/4 beat phase
//! - **Segmentation**: Melody note, chord tones, or both
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_live::{AnalysisConfig, AudioFrame, LiveAnalyzer};
//!
//! let mut analyzer = LiveAnalyzer::new(AnalysisConfig::default())?;
//!
//! // One captured frame: PCM samples plus their dB magnitude spectrum
//! let frame = AudioFrame::new(vec![0.0; 2048], vec![-120.0; 2048], 0.0);
//! let analysis = analyzer.process(&frame);
//!
//! println!("State: {:?}, harmony: {:?}", analysis.state, analysis.harmony.harmony_type);
//! if let Some(key) = analysis.key {
//!     println!("Key: {} (confidence: {:.2})", key.key.name(), key.confidence);
//! }
//! # Ok::<(), stratum_live::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! Each frame flows strictly forward; only bounded histories persist:
//!
//! ```text
//! Frame → Noise Gate → Pitch → Classifier → Chroma → Key → Melody/Harmony → Output
//!                    ↘ Rhythm (every frame) ↗
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::processor::LiveAnalyzer;
pub use analysis::result::{FrameAnalysis, Key, Mode, ProcessingState};
pub use analysis::session::{analyze_clip, analyze_sessions, run_session, SessionReport};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::beat_tracking::RhythmState;
pub use features::chroma::ChromaVector;
pub use features::key::KeyEstimate;
pub use features::pitch::PitchCandidate;
pub use features::segmentation::{HarmonyAnalysis, HarmonyType};
pub use io::frame::{AnalysisSink, AudioFrame, FrameSource, VecSink};
pub use io::sample_buffer::SampleFrameSource;
