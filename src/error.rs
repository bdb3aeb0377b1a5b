//! Error types for the live analysis engine

use std::fmt;

/// Errors that can occur while setting up an analysis session
///
/// The per-frame pipeline itself never fails; these only surface at the edges
/// (configuration, frame sources).
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters
    InvalidInput(String),

    /// Configuration could not be parsed or failed validation
    ConfigError(String),

    /// Reading a configuration file failed
    Io(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AnalysisError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::ConfigError(err.to_string())
    }
}
