//! Renderer error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Export format outside svg/png/pdf/html.
    #[error("Unsupported export format: {0} (expected one of svg, png, pdf, html)")]
    UnsupportedFormat(String),

    /// Writing the output file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Path being written or created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The raster backend failed to produce output.
    #[error("Raster backend failed: {0}")]
    Backend(String),

    /// The raster backend did not finish in time.
    #[error("Rendering timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
}
