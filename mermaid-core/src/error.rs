//! Error types for analyzer operations.

use thiserror::Error;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors raised by an [`Analyzer`](crate::Analyzer) implementation.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The input was empty where content is required.
    #[error("Nothing to analyze: {0}")]
    EmptyInput(String),

    /// The analyzer could not complete the request.
    #[error("Analyzer failed: {0}")]
    Failed(String),
}
