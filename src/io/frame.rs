//! Frame types and the host-facing source/sink seams
//!
//! The analyzer never talks to audio devices. Hosts implement [`FrameSource`]
//! to hand over captured frames and [`AnalysisSink`] to receive per-frame
//! results; [`crate::analysis::session::run_session`] drives one against the
//! other.

use crate::analysis::result::FrameAnalysis;

/// One captured frame: PCM samples plus their dB magnitude spectrum
///
/// Sample rate and FFT size are fixed for the whole session. The spectrum has
/// `fft_size / 2` bins.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Mono PCM samples, nominally in [-1.0, 1.0]
    pub samples: Vec<f32>,

    /// Magnitude spectrum in dB
    pub spectrum_db: Vec<f32>,

    /// Capture time in milliseconds since session start
    pub timestamp_ms: f64,
}

impl AudioFrame {
    /// Build a frame from already computed buffers
    pub fn new(samples: Vec<f32>, spectrum_db: Vec<f32>, timestamp_ms: f64) -> Self {
        Self {
            samples,
            spectrum_db,
            timestamp_ms,
        }
    }

    /// True when either buffer is empty
    pub fn is_degenerate(&self) -> bool {
        self.samples.is_empty() || self.spectrum_db.is_empty()
    }
}

/// Pull-based frame provider
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended
    fn next_frame(&mut self) -> Option<AudioFrame>;
}

/// Push-based result consumer
pub trait AnalysisSink {
    /// Receive the analysis of one frame
    fn consume(&mut self, analysis: &FrameAnalysis);
}

/// Sink that keeps every result in memory
#[derive(Debug, Default)]
pub struct VecSink {
    /// Collected results, in arrival order
    pub results: Vec<FrameAnalysis>,
}

impl VecSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisSink for VecSink {
    fn consume(&mut self, analysis: &FrameAnalysis) {
        self.results.push(analysis.clone());
    }
}
