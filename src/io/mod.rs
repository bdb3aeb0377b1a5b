//! Frame I/O
//!
//! Frame types, the source/sink traits hosts implement, spectrum computation
//! and an in-memory frame source.

pub mod frame;
pub mod sample_buffer;
pub mod spectrum;

pub use frame::{AnalysisSink, AudioFrame, FrameSource, VecSink};
pub use sample_buffer::SampleFrameSource;
pub use spectrum::{magnitude_spectrum_db, SpectrumAnalyzer};
