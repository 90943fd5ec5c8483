//! Tool handlers.
//!
//! Each handler destructures its arguments, calls the analyzer or the export
//! pipeline and formats the outcome as one markdown report. Handlers return
//! errors untouched; the dispatcher turns them into `isError` responses.

use std::fmt::Write;
use std::path::PathBuf;

use mermaid_core::{
    AnalysisDepth, Analyzer, Audience, CodeElementKind, DiagramKind, RequestedKind, Theme,
    WorkflowFormat, WorkflowType,
};
use mermaid_renderer::{ExportFormat, ExportOptions, ExportPipeline};

use crate::args::ToolArgs;
use crate::error::{ToolError, ToolResult};

/// `generate_diagram_from_code`
///
/// # Errors
///
/// Returns an error if arguments are invalid or the analyzer fails.
pub async fn generate_diagram_from_code(
    analyzer: &dyn Analyzer,
    args: &ToolArgs<'_>,
) -> ToolResult<String> {
    let code = args.string("code")?;
    let requested = RequestedKind::from_name(args.string("diagram_type")?);
    let language = args.optional_string("language")?;
    let include_details = args.flag("include_details")?;

    let analysis = analyzer.analyze_structure(code).await?;
    let source = analyzer
        .generate_source(&analysis, requested, include_details)
        .await?;
    let kind = DiagramKind::from_header(source.lines().next().unwrap_or_default());

    let mut out = format!("## Generated {} Diagram\n\n", title_case(kind.label()));
    let _ = writeln!(
        out,
        "**Language:** {}",
        language.unwrap_or("auto-detected")
    );
    let _ = writeln!(
        out,
        "**Structure:** {} function(s), {} branch(es), {} loop(s), {} type(s), {} call(s)",
        analysis.count(CodeElementKind::Function),
        analysis.count(CodeElementKind::Branch),
        analysis.count(CodeElementKind::Loop),
        analysis.count(CodeElementKind::Type),
        analysis.count(CodeElementKind::Call),
    );
    let _ = writeln!(out, "**Complexity:** {}", analysis.complexity);
    if requested == RequestedKind::Auto {
        let _ = writeln!(
            out,
            "**Diagram type:** {} (chosen automatically)",
            analysis.detected_kind
        );
    }
    push_mermaid(&mut out, &source);
    Ok(out)
}

/// `analyze_diagram_structure`
///
/// # Errors
///
/// Returns an error if arguments are invalid or the analyzer fails.
pub async fn analyze_diagram_structure(
    analyzer: &dyn Analyzer,
    args: &ToolArgs<'_>,
) -> ToolResult<String> {
    let source = args.string("diagram_code")?;
    let depth = AnalysisDepth::from_name(args.string("analysis_type")?);

    let inspection = analyzer.inspect(source, depth).await?;

    let mut out = String::from("## Diagram Analysis\n\n");
    let _ = writeln!(out, "**Type:** {}", inspection.kind);
    let _ = writeln!(out, "**Analysis depth:** {}", depth.as_str());

    if depth.includes_structure() {
        out.push_str("\n### Structure\n");
        let _ = writeln!(out, "- Nodes: {}", inspection.node_count);
        let _ = writeln!(out, "- Edges: {}", inspection.edge_count);
    }
    if depth.includes_complexity() {
        out.push_str("\n### Complexity\n");
        let _ = writeln!(out, "- Score: {}", inspection.complexity_score);
    }
    out.push_str("\n### Summary\n");
    let _ = writeln!(out, "{}", inspection.narrative);
    if depth.includes_optimization() {
        out.push_str("\n### Recommendations\n");
        if inspection.recommendations.is_empty() {
            out.push_str("No changes recommended.\n");
        }
        for (idx, rec) in inspection.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {rec}", idx + 1);
        }
    }
    Ok(out)
}

/// `suggest_diagram_improvements`
///
/// # Errors
///
/// Returns an error if arguments are invalid or the analyzer fails.
pub async fn suggest_diagram_improvements(
    analyzer: &dyn Analyzer,
    args: &ToolArgs<'_>,
) -> ToolResult<String> {
    let source = args.string("diagram_code")?;
    let context = args.optional_string("context")?;
    let audience = Audience::from_name(args.string("audience")?);

    let improvements = analyzer
        .suggest_improvements(source, context, audience)
        .await?;

    let mut out = String::from("## Improvement Suggestions\n\n");
    let _ = writeln!(out, "**Audience:** {}", audience.as_str());
    if let Some(context) = context {
        let _ = writeln!(out, "**Context:** {context}");
    }
    if improvements.is_empty() {
        out.push_str("\nThe diagram already follows the usual conventions for this audience.\n");
        return Ok(out);
    }
    for (idx, item) in improvements.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n### {}. {} ({} priority)\n",
            idx + 1,
            item.title,
            item.priority.label()
        );
        let _ = writeln!(out, "{}\n", item.rationale);
        let _ = writeln!(out, "**How:** {}", item.how_to);
        if let Some(rewritten) = &item.rewritten {
            push_mermaid(&mut out, rewritten);
        }
    }
    Ok(out)
}

/// `create_workflow_diagram`
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] for an unknown `workflow_type`,
/// or an analyzer error.
pub async fn create_workflow_diagram(
    analyzer: &dyn Analyzer,
    args: &ToolArgs<'_>,
) -> ToolResult<String> {
    let description = args.string("workflow_description")?;
    let raw_type = args.string("workflow_type")?;
    let workflow_type = WorkflowType::from_name(raw_type).ok_or_else(|| {
        ToolError::InvalidArguments(format!(
            "unknown workflow_type `{raw_type}`; expected one of git, cicd, business, development, deployment"
        ))
    })?;
    let include_decisions = args.flag("include_decision_points")?;
    let format = WorkflowFormat::from_name(args.string("format")?);

    let source = analyzer
        .synthesize_workflow(description, workflow_type, include_decisions, format)
        .await?;

    let mut out = format!(
        "## {} Workflow Diagram\n\n",
        workflow_label(workflow_type)
    );
    let _ = writeln!(out, "**Description:** {description}");
    let _ = writeln!(out, "**Format:** {}", format.as_str());
    let _ = writeln!(
        out,
        "**Decision points:** {}",
        if include_decisions { "included" } else { "omitted" }
    );
    push_mermaid(&mut out, &source);
    Ok(out)
}

/// `export_diagram_formats`
///
/// # Errors
///
/// Returns an error for an unsupported format, invalid dimensions or a
/// failed export.
pub async fn export_diagram_formats(
    pipeline: &ExportPipeline,
    args: &ToolArgs<'_>,
) -> ToolResult<String> {
    let format: ExportFormat = args.string("format")?.parse()?;
    let options = ExportOptions {
        source: args.string("diagram_code")?.to_string(),
        format,
        theme: Theme::from_name(args.string("theme")?),
        width: args.positive("width")?,
        height: args.positive("height")?,
        output_path: args
            .optional_string("output_path")?
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from),
    };

    let result = pipeline.export(&options).await?;

    let mut out = String::from("## Export Complete\n\n");
    let _ = writeln!(
        out,
        "**Format:** {} ({})",
        format.as_str().to_uppercase(),
        format.mime_type()
    );
    let _ = writeln!(out, "**Theme:** {}", options.theme);
    if format.is_raster() {
        let _ = writeln!(out, "**Dimensions:** {}x{}", options.width, options.height);
    }
    let _ = writeln!(out, "**Size:** {}", result.size);
    match (&result.output_path, &result.base64_data) {
        (Some(path), _) => {
            let _ = writeln!(out, "**Saved to:** {path}");
        }
        (None, Some(data)) => {
            let _ = writeln!(
                out,
                "**Data:** returned inline as base64 ({} characters)",
                data.len()
            );
        }
        (None, None) => {}
    }
    let _ = writeln!(out, "\n{}\n", result.details);
    let _ = writeln!(
        out,
        "```json\n{}\n```",
        serde_json::to_string_pretty(&result)?
    );
    Ok(out)
}

/// `validate_diagram_syntax`
///
/// An invalid diagram is a normal report, not an error.
///
/// # Errors
///
/// Returns an error if arguments are invalid or the analyzer fails.
pub async fn validate_diagram_syntax(
    analyzer: &dyn Analyzer,
    args: &ToolArgs<'_>,
) -> ToolResult<String> {
    let source = args.string("diagram_code")?;
    let strict = args.flag("strict_mode")?;
    let provide_suggestions = args.flag("provide_suggestions")?;

    let report = analyzer.validate(source, strict).await?;

    let mut out = String::from("## Syntax Validation\n\n");
    if report.is_valid {
        out.push_str("**Status:** Valid\n");
    } else {
        let _ = writeln!(
            out,
            "**Status:** Invalid ({} error(s))",
            report.errors.len()
        );
    }
    let _ = writeln!(out, "**Type:** {}", report.detected_kind);
    let _ = writeln!(out, "**Nodes:** {}", report.node_count);
    let _ = writeln!(out, "**Complexity:** {}", report.complexity);
    if strict {
        out.push_str("**Mode:** strict\n");
    }

    if !report.errors.is_empty() {
        out.push_str("\n### Errors\n");
        for issue in &report.errors {
            let _ = writeln!(out, "- Line {}: {}", issue.line, issue.message);
        }
    }
    if provide_suggestions {
        if !report.suggestions.is_empty() {
            out.push_str("\n### Suggestions\n");
            for suggestion in &report.suggestions {
                let _ = writeln!(out, "- {suggestion}");
            }
        }
        if let Some(corrected) = &report.corrected {
            out.push_str("\n### Corrected Diagram\n");
            push_mermaid(&mut out, corrected);
        }
    }
    Ok(out)
}

fn push_mermaid(out: &mut String, source: &str) {
    let _ = writeln!(out, "\n```mermaid\n{}\n```", source.trim_end());
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

const fn workflow_label(kind: WorkflowType) -> &'static str {
    match kind {
        WorkflowType::Git => "Git",
        WorkflowType::Cicd => "CI/CD",
        WorkflowType::Business => "Business",
        WorkflowType::Development => "Development",
        WorkflowType::Deployment => "Deployment",
    }
}

#[cfg(test)]
mod tests {
    use mermaid_core::HeuristicAnalyzer;
    use serde_json::json;

    use super::*;
    use crate::registry::ToolRegistry;

    fn bind<'a>(tool: &str, raw: &'a serde_json::Value) -> ToolArgs<'a> {
        let descriptor = ToolRegistry::standard().find(tool).expect("registered");
        ToolArgs::bind(descriptor, raw).expect("bind")
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("user journey"), "User Journey");
        assert_eq!(title_case("flowchart"), "Flowchart");
    }

    #[tokio::test]
    async fn test_generate_reports_language() {
        let raw = json!({
            "code": "def main():\n    if x:\n        run()\n",
            "language": "python"
        });
        let args = bind("generate_diagram_from_code", &raw);
        let out = generate_diagram_from_code(&HeuristicAnalyzer::new(), &args)
            .await
            .expect("generate");
        assert!(out.contains("**Language:** python"));
        assert!(out.contains("```mermaid\n"));
    }

    #[tokio::test]
    async fn test_analyze_structure_only_skips_recommendations() {
        let raw = json!({ "diagram_code": "flowchart TD\n  A-->B", "analysis_type": "structure" });
        let args = bind("analyze_diagram_structure", &raw);
        let out = analyze_diagram_structure(&HeuristicAnalyzer::new(), &args)
            .await
            .expect("analyze");
        assert!(out.contains("### Structure"));
        assert!(!out.contains("### Recommendations"));
        assert!(!out.contains("### Complexity"));
    }

    #[tokio::test]
    async fn test_unknown_workflow_type() {
        let raw = json!({ "workflow_description": "x", "workflow_type": "chaos" });
        let args = bind("create_workflow_diagram", &raw);
        let err = create_workflow_diagram(&HeuristicAnalyzer::new(), &args)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(ref m) if m.contains("chaos")));
    }

    #[tokio::test]
    async fn test_validate_invalid_is_a_report() {
        let raw = json!({ "diagram_code": "flowchart TD\n  A[Start --> B" });
        let args = bind("validate_diagram_syntax", &raw);
        let out = validate_diagram_syntax(&HeuristicAnalyzer::new(), &args)
            .await
            .expect("report");
        assert!(out.contains("**Status:** Invalid"));
        assert!(out.contains("- Line 2:"));
    }

    #[tokio::test]
    async fn test_export_unsupported_format() {
        let raw = json!({ "diagram_code": "graph TD", "format": "gif" });
        let args = bind("export_diagram_formats", &raw);
        let err = export_diagram_formats(&ExportPipeline::new(), &args)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported export format: gif"));
    }

    #[tokio::test]
    async fn test_export_blank_output_path_returns_inline() {
        for path in ["", "   "] {
            let raw = json!({ "diagram_code": "graph TD", "format": "svg", "output_path": path });
            let args = bind("export_diagram_formats", &raw);
            let out = export_diagram_formats(&ExportPipeline::new(), &args)
                .await
                .expect("export");
            assert!(out.contains("returned inline as base64"));
            assert!(!out.contains("**Saved to:**"));
        }
    }
}
