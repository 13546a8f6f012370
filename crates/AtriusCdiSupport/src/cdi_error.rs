//! Error types for CDI pipeline operations
//!
//! Only two conditions are surfaced as errors: a note with no text at all,
//! and structurally invalid caller input. Everything else in the pipeline
//! degrades to partial results (absent fields, lower confidence) rather
//! than failing.

use std::fmt;

/// Result type alias for CDI pipeline operations
pub type CdiResult<T> = Result<T, CdiError>;

/// Error types for CDI pipeline operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdiError {
    /// The supplied note text was empty or whitespace-only
    EmptyNote,

    /// Invalid input parameters from the caller
    InvalidInput(String),
}

impl fmt::Display for CdiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdiError::EmptyNote => write!(f, "Empty note: no text supplied for extraction"),
            CdiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CdiError {}

impl From<String> for CdiError {
    fn from(err: String) -> Self {
        CdiError::InvalidInput(err)
    }
}
