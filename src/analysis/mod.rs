//! Analysis and result aggregation modules
//!
//! Combines the per-stage features into one result per frame:
//! - Result types
//! - Per-frame processor
//! - Session drivers (single stream, parallel batch)

pub mod processor;
pub mod result;
pub mod session;

pub use processor::LiveAnalyzer;
pub use result::{FrameAnalysis, Key, Mode, ProcessingState};
pub use session::{analyze_clip, analyze_sessions, run_session, SessionReport};
