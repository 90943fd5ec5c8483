//! Built-in raster backend.
//!
//! Rasterizes the SVG template with resvg/tiny-skia, scaled to fit and
//! centred in the requested canvas, and wraps the PNG in a single-page PDF
//! with printpdf. Work runs on the blocking pool.

use async_trait::async_trait;
use mermaid_core::Theme;

use crate::backend::{RasterBackend, RasterRequest};
use crate::error::{RenderError, RenderResult};
use crate::export::ExportFormat;
use crate::template;

/// Resolution used to size the PDF page.
const PDF_DPI: f32 = 96.0;

/// Largest accepted width or height, in pixels.
pub const MAX_RASTER_DIMENSION: u32 = 8192;

/// Raster backend backed by resvg and printpdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRasterBackend;

impl SvgRasterBackend {
    /// Create a new backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RasterBackend for SvgRasterBackend {
    fn name(&self) -> &'static str {
        "resvg"
    }

    async fn render(&self, request: &RasterRequest<'_>) -> RenderResult<Vec<u8>> {
        if request.width > MAX_RASTER_DIMENSION || request.height > MAX_RASTER_DIMENSION {
            return Err(RenderError::Backend(format!(
                "{}x{} exceeds the {MAX_RASTER_DIMENSION}x{MAX_RASTER_DIMENSION} raster limit",
                request.width, request.height
            )));
        }
        let svg = template::svg(request.source, request.theme.palette());
        let (format, theme, width, height) =
            (request.format, request.theme, request.width, request.height);
        tokio::task::spawn_blocking(move || render_blocking(&svg, format, theme, width, height))
            .await
            .map_err(|e| RenderError::Backend(format!("Render task failed: {e}")))?
    }
}

fn render_blocking(
    svg: &str,
    format: ExportFormat,
    theme: Theme,
    width: u32,
    height: u32,
) -> RenderResult<Vec<u8>> {
    let png = render_png(svg, theme, width.max(1), height.max(1))?;
    match format {
        ExportFormat::Pdf => wrap_pdf(&png, width.max(1), height.max(1)),
        _ => Ok(png),
    }
}

/// Rasterize an SVG string into a PNG of exactly `width` x `height`.
#[allow(clippy::cast_precision_loss)]
fn render_png(svg: &str, theme: Theme, width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| RenderError::Backend(format!("SVG parsing failed: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Backend(format!("Cannot allocate {width}x{height} pixmap")))?;
    pixmap.fill(background(theme));

    let size = tree.size();
    let scale = (width as f32 / size.width()).min(height as f32 / size.height());
    let dx = (width as f32 - size.width() * scale) / 2.0;
    let dy = (height as f32 - size.height() * scale) / 2.0;
    let transform = tiny_skia::Transform::from_scale(scale, scale).post_translate(dx, dy);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Backend(format!("PNG encoding failed: {e}")))
}

fn background(theme: Theme) -> tiny_skia::Color {
    match theme {
        Theme::Dark => tiny_skia::Color::from_rgba8(0x1e, 0x1e, 0x1e, 0xff),
        Theme::Default | Theme::Forest | Theme::Neutral => tiny_skia::Color::WHITE,
    }
}

/// Embed a PNG in a single PDF page sized to the image.
#[allow(clippy::cast_precision_loss)]
fn wrap_pdf(png: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let page_width_mm = width as f32 / PDF_DPI * 25.4;
    let page_height_mm = height as f32 / PDF_DPI * 25.4;

    let (doc, page, layer) = printpdf::PdfDocument::new(
        "Mermaid Diagram",
        printpdf::Mm(page_width_mm),
        printpdf::Mm(page_height_mm),
        "Diagram",
    );
    let current_layer = doc.get_page(page).get_layer(layer);

    let image = printpdf::image_crate::load_from_memory(png)
        .map_err(|e| RenderError::Backend(format!("Failed to decode PNG for PDF: {e}")))?;
    printpdf::Image::from_dynamic_image(&image).add_to_layer(
        current_layer,
        printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(PDF_DPI),
            ..Default::default()
        },
    );

    doc.save_to_bytes()
        .map_err(|e| RenderError::Backend(format!("PDF save failed: {e}")))
}
