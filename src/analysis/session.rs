//! Session drivers
//!
//! [`run_session`] pulls frames from a [`FrameSource`] into a
//! [`LiveAnalyzer`] and pushes every result to an [`AnalysisSink`].
//! [`analyze_sessions`] runs several independent in-memory clips in parallel,
//! one analyzer per clip.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use super::processor::LiveAnalyzer;
use super::result::{FrameAnalysis, ProcessingState};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::key::KeyEstimate;
use crate::io::frame::{AnalysisSink, FrameSource, VecSink};
use crate::io::sample_buffer::SampleFrameSource;

/// Drive `analyzer` until `source` is exhausted
///
/// Returns the number of frames processed.
pub fn run_session<S, K>(analyzer: &mut LiveAnalyzer, source: &mut S, sink: &mut K) -> usize
where
    S: FrameSource + ?Sized,
    K: AnalysisSink + ?Sized,
{
    let mut frames = 0usize;
    while let Some(frame) = source.next_frame() {
        let analysis = analyzer.process(&frame);
        sink.consume(&analysis);
        frames += 1;
    }
    log::debug!("Session finished after {} frames", frames);
    frames
}

/// Outcome of analysing one clip
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Per-frame results, in order
    pub frames: Vec<FrameAnalysis>,

    /// Frames classified as musical input
    pub musical_frames: usize,

    /// Smoothed key at the end of the clip
    pub final_key: Option<KeyEstimate>,

    /// Tempo at the end of the clip
    pub tempo_bpm: f32,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,
}

/// Analyse one mono clip from start to end with a fresh analyzer
///
/// # Errors
///
/// Returns `AnalysisError` if the configuration is invalid or `hop_size` is 0.
pub fn analyze_clip(
    samples: &[f32],
    config: &AnalysisConfig,
    hop_size: usize,
) -> Result<SessionReport, AnalysisError> {
    let start_time = Instant::now();
    let mut analyzer = LiveAnalyzer::new(config.clone())?;
    let mut source = SampleFrameSource::new(samples.to_vec(), config, hop_size)?;
    let mut sink = VecSink::new();

    run_session(&mut analyzer, &mut source, &mut sink);

    let musical_frames = sink
        .results
        .iter()
        .filter(|f| f.state == ProcessingState::MusicalInput)
        .count();

    Ok(SessionReport {
        musical_frames,
        final_key: analyzer.current_key(),
        tempo_bpm: analyzer.tempo_bpm(),
        processing_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
        frames: sink.results,
    })
}

/// Analyse independent clips in parallel
///
/// Each clip gets its own analyzer; nothing is shared between sessions.
/// Results come back in the order of `clips`.
pub fn analyze_sessions(
    clips: &[Vec<f32>],
    config: &AnalysisConfig,
    hop_size: usize,
) -> Vec<Result<SessionReport, AnalysisError>> {
    log::debug!("Analysing {} clips in parallel (hop={})", clips.len(), hop_size);
    clips
        .par_iter()
        .map(|clip| analyze_clip(clip, config, hop_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::frame::AudioFrame;

    struct Countdown(usize);

    impl FrameSource for Countdown {
        fn next_frame(&mut self) -> Option<AudioFrame> {
            if self.0 == 0 {
                return None;
            }
            self.0 -= 1;
            Some(AudioFrame::new(vec![0.0; 2048], vec![-120.0; 2048], self.0 as f64))
        }
    }

    #[test]
    fn test_run_session_counts_frames() {
        let mut analyzer = LiveAnalyzer::new(AnalysisConfig::default()).unwrap();
        let mut sink = VecSink::new();
        let frames = run_session(&mut analyzer, &mut Countdown(7), &mut sink);
        assert_eq!(frames, 7);
        assert_eq!(sink.results.len(), 7);
        assert!(sink.results.iter().all(|r| r.state == ProcessingState::Idle));
    }

    #[test]
    fn test_zero_hop_is_error() {
        let config = AnalysisConfig::default();
        assert!(analyze_clip(&[0.0; 8192], &config, 0).is_err());
    }

    #[test]
    fn test_sessions_keep_order() {
        let config = AnalysisConfig::default();
        let clips = vec![vec![0.0f32; 8192], vec![0.0f32; 4096], vec![0.0f32; 100]];
        let reports = analyze_sessions(&clips, &config, 1024);
        assert_eq!(reports.len(), 3);
        let counts: Vec<usize> = reports
            .iter()
            .map(|r| r.as_ref().map(|r| r.frames.len()).unwrap_or(usize::MAX))
            .collect();
        assert_eq!(counts, vec![5, 1, 0]);
    }
}
