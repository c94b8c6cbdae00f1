//! Error types for sequence and database input

use thiserror::Error;

/// Errors raised while reading or validating profiling inputs.
///
/// The profiler itself never fails; these only surface at the boundary
/// where raw text is turned into sequences and fingerprints.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input was readable but its content is unusable
    #[error("parse error: {0}")]
    Parse(String),

    /// Values that are well-formed but not allowed (negative counts, empty markers)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Saving or loading results as JSON failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
