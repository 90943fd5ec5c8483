//! # Mermaid Renderer
//!
//! Export pipeline for Mermaid diagrams.
//!
//! ## Output modes
//!
//! Every export either writes one file (when an output path is given) or
//! returns the payload base64-encoded. The two never mix.
//!
//! ## Formats
//!
//! - **SVG**: themed template with the source embedded as a comment
//! - **HTML**: standalone page that renders the source with Mermaid.js
//! - **PNG / PDF**: a [`RasterBackend`] when configured, otherwise fixed
//!   placeholders with an estimated size
//!
//! Enable the `raster` feature for [`SvgRasterBackend`], a built-in backend
//! based on resvg and printpdf.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod export;
#[cfg(feature = "raster")]
pub mod raster;
pub mod template;

pub use backend::{RasterBackend, RasterRequest};
pub use error::{RenderError, RenderResult};
pub use export::{
    format_size, ExportFormat, ExportOptions, ExportPipeline, ExportResult, DEFAULT_HEIGHT,
    DEFAULT_RENDER_TIMEOUT, DEFAULT_WIDTH,
};
#[cfg(feature = "raster")]
pub use raster::{SvgRasterBackend, MAX_RASTER_DIMENSION};
