//! In-memory frame source
//!
//! Slices a mono PCM buffer into overlapping frames, producing the same
//! [`AudioFrame`]s a live capture host would deliver: the spectrum covers the
//! latest `fft_size` samples and the time-domain buffer holds the newest
//! `window_size` of them.

use super::frame::{AudioFrame, FrameSource};
use super::spectrum::SpectrumAnalyzer;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Frame source over a buffer of samples
pub struct SampleFrameSource {
    /// Buffer data
    data: Vec<f32>,
    /// Start of the next span
    position: usize,
    span: usize,
    window_size: usize,
    hop_size: usize,
    sample_rate: u32,
    spectrum: SpectrumAnalyzer,
}

impl SampleFrameSource {
    /// Create a source that advances `hop_size` samples per frame
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if `hop_size` is zero.
    pub fn new(
        samples: Vec<f32>,
        config: &AnalysisConfig,
        hop_size: usize,
    ) -> Result<Self, AnalysisError> {
        if hop_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Hop size must be > 0".to_string(),
            ));
        }
        config.validate()?;

        log::debug!(
            "Frame source: {} samples, window={}, hop={}, fft={}",
            samples.len(),
            config.window_size,
            hop_size,
            config.fft_size
        );

        Ok(Self {
            data: samples,
            position: 0,
            span: config.fft_size,
            window_size: config.window_size,
            hop_size,
            sample_rate: config.sample_rate,
            spectrum: SpectrumAnalyzer::new(config.fft_size),
        })
    }

    /// Add samples to the end of the buffer
    pub fn push(&mut self, samples: &[f32]) {
        self.data.extend_from_slice(samples);
    }

    /// Number of complete frames still available
    pub fn remaining_frames(&self) -> usize {
        let available = self.data.len().saturating_sub(self.position);
        if available < self.span {
            0
        } else {
            (available - self.span) / self.hop_size + 1
        }
    }

    /// Get next span of samples
    fn next_span(&mut self) -> Option<(usize, &[f32])> {
        if self.position + self.span > self.data.len() {
            return None;
        }
        let start = self.position;
        self.position += self.hop_size;
        Some((start, &self.data[start..start + self.span]))
    }
}

impl FrameSource for SampleFrameSource {
    fn next_frame(&mut self) -> Option<AudioFrame> {
        let sample_rate = self.sample_rate as f64;
        let window_size = self.window_size;
        let (start, span) = self.next_span()?;
        let end = start + span.len();
        let samples = span[span.len() - window_size..].to_vec();
        let block = span.to_vec();
        let spectrum_db = self.spectrum.magnitudes_db(&block);
        // timestamp the end of the span, i.e. when a live host would have it
        let timestamp_ms = end as f64 * 1000.0 / sample_rate;
        Some(AudioFrame::new(samples, spectrum_db, timestamp_ms))
    }
}
