//! Raster backend seam.
//!
//! PNG and PDF output needs a real renderer. The pipeline calls a
//! [`RasterBackend`] when one is configured and falls back to documented
//! placeholders otherwise.

use async_trait::async_trait;
use mermaid_core::Theme;

use crate::error::RenderResult;
use crate::export::ExportFormat;

/// Everything a backend needs to draw one diagram.
#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    /// Mermaid source text.
    pub source: &'a str,
    /// Either [`ExportFormat::Png`] or [`ExportFormat::Pdf`].
    pub format: ExportFormat,
    /// Resolved theme.
    pub theme: Theme,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// A renderer able to produce PNG or PDF bytes.
#[async_trait]
pub trait RasterBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Render the request to raw bytes in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Backend`](crate::RenderError::Backend) when the
    /// backend cannot draw the diagram.
    async fn render(&self, request: &RasterRequest<'_>) -> RenderResult<Vec<u8>>;
}
