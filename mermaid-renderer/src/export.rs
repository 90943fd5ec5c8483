//! Multi-format export pipeline.
//!
//! [`ExportPipeline::export`] renders the requested format and then branches
//! on the output mode: with an output path the payload is written to disk,
//! without one it is returned base64-encoded. Exactly one of
//! [`ExportResult::output_path`] and [`ExportResult::base64_data`] is set.
//!
//! SVG and HTML are produced by the local templates. PNG and PDF go through
//! a [`RasterBackend`] when one is configured; otherwise the pipeline runs in
//! placeholder mode and emits fixed stand-in payloads with an estimated size.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mermaid_core::Theme;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::backend::{RasterBackend, RasterRequest};
use crate::error::{RenderError, RenderResult};
use crate::template;

/// Default raster width in pixels.
pub const DEFAULT_WIDTH: u32 = 1920;

/// Default raster height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Default bound on a single raster backend call.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Estimated size reported for placeholder PNG output.
const PNG_ESTIMATE_KB: u32 = 45;

/// Estimated size reported for placeholder PDF output.
const PDF_ESTIMATE_KB: u32 = 120;

/// 1x1 transparent PNG returned inline in placeholder mode.
const PNG_PLACEHOLDER: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x60, 0x00, 0x02, 0x00,
    0x00, 0x05, 0x00, 0x01, 0x7a, 0x5e, 0xab, 0x3f, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44,
    0xae, 0x42, 0x60, 0x82,
];

/// Blank one-page PDF returned inline in placeholder mode.
const PDF_PLACEHOLDER: &[u8] = b"%PDF-1.4\n\
1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >>\nendobj\n\
xref\n0 4\n0000000000 65535 f \n0000000009 00000 n \n0000000058 00000 n \n0000000115 00000 n \n\
trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n186\n%%EOF\n";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Scalable Vector Graphics.
    Svg,
    /// PNG raster image.
    Png,
    /// PDF document.
    Pdf,
    /// Standalone HTML page rendered by Mermaid.js.
    Html,
}

impl ExportFormat {
    /// Every format, in catalog order.
    pub const ALL: [Self; 4] = [Self::Svg, Self::Png, Self::Pdf, Self::Html];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }

    /// MIME type of the payload.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
            Self::Html => "text/html",
        }
    }

    /// Conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Whether the format needs a raster backend for a real render.
    #[must_use]
    pub const fn is_raster(self) -> bool {
        matches!(self, Self::Png | Self::Pdf)
    }
}

/// Only the exact lowercase names are accepted.
impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| RenderError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`ExportPipeline::export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Mermaid source text.
    pub source: String,
    /// Target format.
    pub format: ExportFormat,
    /// Colour theme.
    pub theme: Theme,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Where to write the payload; `None` returns it inline.
    pub output_path: Option<PathBuf>,
}

impl ExportOptions {
    /// Options with the default theme, 1920x1080 and inline output.
    #[must_use]
    pub fn new(source: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            source: source.into(),
            format,
            theme: Theme::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            output_path: None,
        }
    }

    /// Set the theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the raster dimensions.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Write the payload to `path` instead of returning it inline.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// Always `true`; failures are reported as [`RenderError`].
    pub success: bool,
    /// Absolute path of the written file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Base64 payload when no output path was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_data: Option<String>,
    /// Human-readable size, e.g. `2KB` or `~45KB (estimated)`.
    pub size: String,
    /// What was produced.
    pub details: String,
}

impl ExportResult {
    fn saved(path: &Path, size: String, details: String) -> Self {
        Self {
            success: true,
            output_path: Some(path.display().to_string()),
            base64_data: None,
            size,
            details,
        }
    }

    fn inline(bytes: &[u8], size: String, details: String) -> Self {
        Self {
            success: true,
            output_path: None,
            base64_data: Some(STANDARD.encode(bytes)),
            size,
            details,
        }
    }
}

/// A rendered payload waiting to be delivered.
struct Rendered {
    bytes: Vec<u8>,
    /// Fixed estimate for placeholders; measured otherwise.
    estimated_kb: Option<u32>,
    details: String,
}

impl Rendered {
    fn size(&self) -> String {
        match self.estimated_kb {
            Some(kb) => format!("~{kb}KB (estimated)"),
            None => format_size(self.bytes.len()),
        }
    }
}

/// Format a byte count as rounded kilobytes.
#[must_use]
pub fn format_size(bytes: usize) -> String {
    format!("{}KB", (bytes + 512) / 1024)
}

/// Renders diagrams and delivers them to disk or inline.
#[derive(Clone)]
pub struct ExportPipeline {
    raster: Option<Arc<dyn RasterBackend>>,
    render_timeout: Duration,
}

impl ExportPipeline {
    /// Create a pipeline in placeholder mode for PNG and PDF.
    #[must_use]
    pub fn new() -> Self {
        Self {
            raster: None,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Route PNG and PDF through `backend`.
    #[must_use]
    pub fn with_raster_backend(mut self, backend: Arc<dyn RasterBackend>) -> Self {
        self.raster = Some(backend);
        self
    }

    /// Bound each raster backend call.
    #[must_use]
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Name of the configured raster backend, if any.
    #[must_use]
    pub fn raster_backend_name(&self) -> Option<&'static str> {
        self.raster.as_ref().map(|backend| backend.name())
    }

    /// Render `options.source` and deliver it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] when the output cannot be written,
    /// [`RenderError::Backend`] or [`RenderError::Timeout`] when a configured
    /// raster backend fails.
    pub async fn export(&self, options: &ExportOptions) -> RenderResult<ExportResult> {
        let theme = options.theme;
        let rendered = match options.format {
            ExportFormat::Svg => Rendered {
                bytes: template::svg(&options.source, theme.palette()).into_bytes(),
                estimated_kb: None,
                details: format!(
                    "SVG diagram ({}x{} template, {theme} theme)",
                    template::SVG_WIDTH,
                    template::SVG_HEIGHT
                ),
            },
            ExportFormat::Html => Rendered {
                bytes: template::html(&options.source, theme).into_bytes(),
                estimated_kb: None,
                details: format!("Standalone HTML page rendered by Mermaid.js ({theme} theme)"),
            },
            ExportFormat::Png | ExportFormat::Pdf => match &self.raster {
                Some(backend) => self.render_raster(backend.as_ref(), options).await?,
                None => placeholder(options),
            },
        };

        let size = rendered.size();
        match &options.output_path {
            Some(path) => {
                let resolved = write_output(path, &rendered.bytes).await?;
                tracing::info!(
                    format = %options.format,
                    path = %resolved.display(),
                    %size,
                    "Diagram exported to file"
                );
                Ok(ExportResult::saved(&resolved, size, rendered.details))
            }
            None => {
                tracing::debug!(format = %options.format, %size, "Diagram exported inline");
                Ok(ExportResult::inline(&rendered.bytes, size, rendered.details))
            }
        }
    }

    async fn render_raster(
        &self,
        backend: &dyn RasterBackend,
        options: &ExportOptions,
    ) -> RenderResult<Rendered> {
        let request = RasterRequest {
            source: &options.source,
            format: options.format,
            theme: options.theme,
            width: options.width,
            height: options.height,
        };
        tracing::debug!(
            backend = backend.name(),
            format = %options.format,
            width = options.width,
            height = options.height,
            "Rendering with raster backend"
        );
        let bytes = tokio::time::timeout(self.render_timeout, backend.render(&request))
            .await
            .map_err(|_| RenderError::Timeout(self.render_timeout))??;
        Ok(Rendered {
            bytes,
            estimated_kb: None,
            details: format!(
                "{} rendered by {} at {}x{} ({} theme)",
                options.format.as_str().to_uppercase(),
                backend.name(),
                options.width,
                options.height,
                options.theme
            ),
        })
    }
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("raster", &self.raster_backend_name())
            .field("render_timeout", &self.render_timeout)
            .finish()
    }
}

/// Stand-in payload used when no raster backend is configured.
///
/// Files get a short text note; inline output gets a constant minimal
/// PNG or PDF. The source is ignored, so empty input is fine.
fn placeholder(options: &ExportOptions) -> Rendered {
    let (label, blob, estimated_kb) = match options.format {
        ExportFormat::Pdf => ("PDF", PDF_PLACEHOLDER, PDF_ESTIMATE_KB),
        _ => ("PNG", PNG_PLACEHOLDER, PNG_ESTIMATE_KB),
    };
    let bytes = if options.output_path.is_some() {
        format!(
            "{label} placeholder: no renderer configured ({}x{}, {} theme)\n",
            options.width, options.height, options.theme
        )
        .into_bytes()
    } else {
        blob.to_vec()
    };
    Rendered {
        bytes,
        estimated_kb: Some(estimated_kb),
        details: format!(
            "{label} placeholder at {}x{} (no renderer configured)",
            options.width, options.height
        ),
    }
}

/// Write `bytes` to `path`, creating parent directories, and return the
/// canonical path.
async fn write_output(path: &Path, bytes: &[u8]) -> RenderResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        match fs::create_dir_all(parent).await {
            Err(source) if source.kind() != ErrorKind::AlreadyExists => {
                return Err(RenderError::Io {
                    path: parent.to_path_buf(),
                    source,
                });
            }
            _ => {}
        }
    }
    fs::write(path, bytes).await.map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    fs::canonicalize(path).await.map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("svg".parse::<ExportFormat>().ok(), Some(ExportFormat::Svg));
        assert_eq!("pdf".parse::<ExportFormat>().ok(), Some(ExportFormat::Pdf));
        let err = "gif".parse::<ExportFormat>();
        assert!(matches!(err, Err(RenderError::UnsupportedFormat(ref f)) if f == "gif"));
    }

    #[test]
    fn test_format_parsing_is_exact() {
        for name in ["PDF", "Svg", " svg ", "png\n", ""] {
            let err = name.parse::<ExportFormat>();
            assert!(
                matches!(err, Err(RenderError::UnsupportedFormat(ref f)) if f == name),
                "{name:?} accepted"
            );
        }
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Svg.mime_type(), "image/svg+xml");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(ExportFormat::Html.extension(), "html");
        assert!(ExportFormat::Png.is_raster());
        assert!(!ExportFormat::Html.is_raster());
    }

    #[test]
    fn test_format_size_rounds() {
        assert_eq!(format_size(0), "0KB");
        assert_eq!(format_size(511), "0KB");
        assert_eq!(format_size(512), "1KB");
        assert_eq!(format_size(2048), "2KB");
        assert_eq!(format_size(2600), "3KB");
    }

    #[test]
    fn test_placeholder_blobs_have_magic() {
        assert!(PNG_PLACEHOLDER.starts_with(b"\x89PNG"));
        assert!(PDF_PLACEHOLDER.starts_with(b"%PDF-"));
        assert!(PDF_PLACEHOLDER.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_result_serializes_one_output() {
        let result = ExportResult::inline(b"abc", "0KB".into(), "x".into());
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["base64Data"], "YWJj");
        assert!(json.get("outputPath").is_none());
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_inline_svg() {
        let pipeline = ExportPipeline::new();
        let options =
            ExportOptions::new("flowchart TD\nA-->B", ExportFormat::Svg).with_theme(Theme::Forest);
        let result = pipeline.export(&options).await.expect("export");
        assert!(result.output_path.is_none());
        let decoded = STANDARD
            .decode(result.base64_data.expect("inline data"))
            .expect("valid base64");
        let svg = String::from_utf8(decoded).expect("utf8");
        assert!(svg.contains("#13540C"));
        assert!(result.size.ends_with("KB"));
    }

    #[tokio::test]
    async fn test_placeholder_png_inline_is_constant() {
        let pipeline = ExportPipeline::new();
        let a = pipeline
            .export(&ExportOptions::new("", ExportFormat::Png))
            .await
            .expect("export");
        let b = pipeline
            .export(&ExportOptions::new("graph LR\nX-->Y", ExportFormat::Png))
            .await
            .expect("export");
        assert_eq!(a.base64_data, b.base64_data);
        assert_eq!(a.size, "~45KB (estimated)");
        assert!(a.details.contains("no renderer configured"));
    }

    #[test]
    fn test_pipeline_debug_names_backend() {
        let debug = format!("{:?}", ExportPipeline::new());
        assert!(debug.contains("raster: None"));
    }
}
