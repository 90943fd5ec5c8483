//! Local SVG and HTML templates.
//!
//! The SVG template is a fixed two-node demonstration drawn in the theme's
//! palette; the diagram source only appears as a truncated comment. Real
//! layout of arbitrary source belongs to a [`RasterBackend`] or an external
//! renderer.
//!
//! [`RasterBackend`]: crate::backend::RasterBackend

use std::fmt::Write;

use mermaid_core::{Theme, ThemePalette};

/// SVG canvas width.
pub const SVG_WIDTH: u32 = 400;

/// SVG canvas height.
pub const SVG_HEIGHT: u32 = 300;

/// Characters of diagram source embedded in the SVG comment.
pub const SOURCE_PREVIEW_CHARS: usize = 50;

/// Mermaid runtime loaded by the HTML export.
pub const MERMAID_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Render the SVG template.
#[must_use]
pub fn svg(source: &str, palette: &ThemePalette) -> String {
    let preview: String = source.chars().take(SOURCE_PREVIEW_CHARS).collect();
    let ThemePalette {
        node_fill,
        node_stroke,
        edge,
        text,
    } = *palette;

    let mut svg = String::with_capacity(1024);
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SVG_WIDTH}\" height=\"{SVG_HEIGHT}\" viewBox=\"0 0 {SVG_WIDTH} {SVG_HEIGHT}\">",
    );
    let _ = writeln!(svg, "  <!-- Mermaid source: {} -->", comment_safe(&preview));
    let _ = writeln!(
        svg,
        "  <defs><marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"10\" refY=\"3.5\" orient=\"auto\"><polygon points=\"0 0, 10 3.5, 0 7\" fill=\"{edge}\"/></marker></defs>",
    );
    for (x, y, label) in [(50, 50, "Start"), (230, 190, "End")] {
        let _ = writeln!(
            svg,
            "  <rect x=\"{x}\" y=\"{y}\" width=\"120\" height=\"60\" rx=\"5\" fill=\"{node_fill}\" stroke=\"{node_stroke}\" stroke-width=\"2\"/>",
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"14\" fill=\"{text}\">{label}</text>",
            x + 60,
            y + 35,
        );
    }
    let _ = writeln!(
        svg,
        "  <line x1=\"170\" y1=\"80\" x2=\"230\" y2=\"220\" stroke=\"{edge}\" stroke-width=\"2\" marker-end=\"url(#arrowhead)\"/>",
    );
    svg.push_str("</svg>\n");
    svg
}

/// Render a standalone HTML page that draws the diagram with Mermaid.js.
///
/// The source is embedded verbatim; Mermaid reads it from the container's
/// text content.
#[must_use]
pub fn html(source: &str, theme: Theme) -> String {
    let (background, foreground) = match theme {
        Theme::Dark => ("#1e1e1e", "#e0e0e0"),
        Theme::Default | Theme::Forest | Theme::Neutral => ("#ffffff", "#333333"),
    };
    let theme_name = theme.as_str();

    let mut html = String::with_capacity(source.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str("  <title>Mermaid Diagram</title>\n");
    let _ = writeln!(html, "  <script src=\"{MERMAID_CDN_URL}\"></script>");
    html.push_str("  <style>\n");
    let _ = writeln!(
        html,
        "    body {{ margin: 0; padding: 20px; font-family: sans-serif; background: {background}; color: {foreground}; }}",
    );
    html.push_str("    .mermaid { display: flex; justify-content: center; }\n");
    html.push_str("  </style>\n</head>\n<body>\n");
    html.push_str("  <div class=\"mermaid\">\n");
    html.push_str(source);
    if !source.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("  </div>\n  <script>\n");
    let _ = writeln!(
        html,
        "    mermaid.initialize({{ startOnLoad: true, theme: '{theme_name}' }});",
    );
    html.push_str("  </script>\n</body>\n</html>\n");
    html
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// XML comments may not contain `--`, which every Mermaid arrow does.
fn comment_safe(input: &str) -> String {
    let mut out = escape_xml(input).replace(['\n', '\r'], " ");
    while out.contains("--") {
        out = out.replace("--", "- -");
    }
    out.trim_end_matches('-').to_string()
}
