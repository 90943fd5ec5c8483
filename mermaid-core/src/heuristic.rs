//! In-process [`Analyzer`] built on keyword and line scanning.
//!
//! The heuristics are deliberately shallow: they recognise common shapes in
//! source code and Mermaid text without building a syntax tree.

use std::fmt::Write;

use async_trait::async_trait;

use crate::analyzer::{
    Analyzer, CodeElement, CodeElementKind, Improvement, Inspection, Priority, StructureAnalysis,
    SyntaxIssue, Validation,
};
use crate::diagram::{
    AnalysisDepth, Audience, ComplexityClass, DiagramKind, RequestedKind, WorkflowFormat,
    WorkflowType,
};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::scan::{self, SourceScan};
use crate::workflow;

/// Keywords that introduce a type definition.
const TYPE_KEYWORDS: [&str; 6] = ["class ", "struct ", "interface ", "trait ", "enum ", "impl "];

/// Keywords that introduce a function definition.
const FUNCTION_KEYWORDS: [&str; 5] = ["fn ", "def ", "function ", "func ", "async def "];

/// Keywords that introduce a branch.
const BRANCH_KEYWORDS: [&str; 6] = ["if ", "if(", "elif ", "else if", "match ", "switch"];

/// Keywords that introduce a loop.
const LOOP_KEYWORDS: [&str; 5] = ["for ", "for(", "while ", "while(", "loop "];

/// Maximum label length in generated diagrams.
const MAX_LABEL: usize = 40;

/// Keyword-driven analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    /// Create a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Analyzer for HeuristicAnalyzer {
    async fn analyze_structure(&self, source: &str) -> AnalyzerResult<StructureAnalysis> {
        if source.trim().is_empty() {
            return Err(AnalyzerError::EmptyInput("no code provided".to_string()));
        }
        let elements = scan_code(source);
        let analysis = StructureAnalysis {
            detected_kind: suggest_kind(&elements),
            complexity: ComplexityClass::from_count(
                elements
                    .iter()
                    .filter(|e| matches!(e.kind, CodeElementKind::Branch | CodeElementKind::Loop))
                    .count()
                    * 3
                    + elements.len() / 2,
            ),
            elements,
        };
        tracing::debug!(
            kind = %analysis.detected_kind,
            elements = analysis.elements.len(),
            "Analyzed code structure"
        );
        Ok(analysis)
    }

    async fn generate_source(
        &self,
        analysis: &StructureAnalysis,
        requested: RequestedKind,
        include_details: bool,
    ) -> AnalyzerResult<String> {
        let kind = match requested {
            RequestedKind::Auto => match analysis.detected_kind {
                DiagramKind::Sequence => RequestedKind::Sequence,
                DiagramKind::Class => RequestedKind::Class,
                DiagramKind::State => RequestedKind::State,
                _ => RequestedKind::Flowchart,
            },
            other => other,
        };
        Ok(match kind {
            RequestedKind::Sequence => sequence_from_code(analysis, include_details),
            RequestedKind::Class => class_from_code(analysis, include_details),
            RequestedKind::State => state_from_code(analysis, include_details),
            RequestedKind::Flowchart | RequestedKind::Auto => {
                flowchart_from_code(analysis, include_details)
            }
        })
    }

    async fn inspect(&self, source: &str, depth: AnalysisDepth) -> AnalyzerResult<Inspection> {
        if source.trim().is_empty() {
            return Err(AnalyzerError::EmptyInput("diagram source is empty".to_string()));
        }
        let scan = scan::scan(source);
        let score = complexity_score(&scan);
        let mut narrative = format!(
            "This {} diagram has {} nodes connected by {} edges",
            scan.kind,
            scan.node_count(),
            scan.edge_count
        );
        if scan.subgraph_count > 0 {
            let _ = write!(
                narrative,
                " organised into {} subgraph(s) nested {} level(s) deep",
                scan.subgraph_count, scan.max_nesting
            );
        }
        narrative.push('.');
        if depth.includes_complexity() {
            let _ = write!(
                narrative,
                " Its complexity score is {score} ({}).",
                ComplexityClass::from_count(score / 2)
            );
        }

        let recommendations = if depth.includes_optimization() {
            improvements_for(&scan, source, None, Audience::General)
                .into_iter()
                .map(|i| format!("{}: {}", i.title, i.how_to))
                .collect()
        } else {
            Vec::new()
        };

        Ok(Inspection {
            kind: scan.kind,
            node_count: scan.node_count(),
            edge_count: scan.edge_count,
            complexity_score: score,
            narrative,
            recommendations,
        })
    }

    async fn suggest_improvements(
        &self,
        source: &str,
        context: Option<&str>,
        audience: Audience,
    ) -> AnalyzerResult<Vec<Improvement>> {
        if source.trim().is_empty() {
            return Err(AnalyzerError::EmptyInput("diagram source is empty".to_string()));
        }
        let scan = scan::scan(source);
        Ok(improvements_for(&scan, source, context, audience))
    }

    async fn synthesize_workflow(
        &self,
        description: &str,
        workflow_type: WorkflowType,
        include_decisions: bool,
        format: WorkflowFormat,
    ) -> AnalyzerResult<String> {
        Ok(workflow::build(
            description,
            workflow_type,
            include_decisions,
            format,
        ))
    }

    async fn validate(&self, source: &str, strict: bool) -> AnalyzerResult<Validation> {
        Ok(validate_source(source, strict))
    }
}

// ---------------------------------------------------------------------------
// Code scanning
// ---------------------------------------------------------------------------

fn scan_code(source: &str) -> Vec<CodeElement> {
    let mut elements = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();
        let stripped = strip_modifiers(line);
        let mut push = |kind, name: String| {
            elements.push(CodeElement {
                kind,
                name,
                line: idx + 1,
                indent,
            });
        };

        if let Some(name) = after_keyword(stripped, &TYPE_KEYWORDS) {
            push(CodeElementKind::Type, identifier(name));
        } else if let Some(name) = after_keyword(stripped, &FUNCTION_KEYWORDS) {
            push(CodeElementKind::Function, identifier(name));
        } else if starts_with_any(stripped, &BRANCH_KEYWORDS) || stripped.starts_with("} else if")
        {
            push(CodeElementKind::Branch, condition(stripped));
        } else if starts_with_any(stripped, &LOOP_KEYWORDS) || stripped == "loop {" {
            push(CodeElementKind::Loop, condition(stripped));
        } else if stripped.starts_with("return") {
            push(CodeElementKind::Return, clip(stripped.trim_end_matches(';')));
        } else {
            for call in calls_in(stripped) {
                push(CodeElementKind::Call, call);
            }
        }
    }
    elements
}

fn strip_modifiers(line: &str) -> &str {
    let mut line = line;
    for modifier in ["pub(crate) ", "pub ", "export ", "public ", "private ", "static ", "async "] {
        if let Some(rest) = line.strip_prefix(modifier) {
            line = rest;
        }
    }
    line
}

fn starts_with_any(line: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| line.starts_with(k))
}

fn after_keyword<'a>(line: &'a str, keywords: &[&str]) -> Option<&'a str> {
    keywords.iter().find_map(|k| line.strip_prefix(k))
}

fn identifier(text: &str) -> String {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    if end == 0 {
        "anonymous".to_string()
    } else {
        text[..end].to_string()
    }
}

fn condition(line: &str) -> String {
    let cleaned = line
        .trim_start_matches('}')
        .trim()
        .trim_end_matches(['{', ':'])
        .trim();
    clip(cleaned)
}

/// `receiver.method(` patterns outside of strings.
fn calls_in(line: &str) -> Vec<String> {
    let mut calls = Vec::new();
    let code = line.split('"').step_by(2).collect::<Vec<_>>().join(" ");
    for (pos, _) in code.match_indices('(') {
        let head = &code[..pos];
        let start = head
            .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .map_or(0, |p| p + 1);
        let callee = head[start..].trim_matches('.');
        if let Some((receiver, method)) = callee.rsplit_once('.') {
            let receiver = receiver.rsplit('.').next().unwrap_or(receiver);
            if !receiver.is_empty() && !method.is_empty() && receiver != "self" {
                calls.push(format!("{receiver}.{method}"));
            }
        }
    }
    calls
}

fn suggest_kind(elements: &[CodeElement]) -> DiagramKind {
    let count = |kind| elements.iter().filter(|e| e.kind == kind).count();
    let types = count(CodeElementKind::Type);
    let calls = count(CodeElementKind::Call);
    let control = count(CodeElementKind::Branch) + count(CodeElementKind::Loop);
    if types > 0 && control < 3 {
        DiagramKind::Class
    } else if calls >= 3 && control == 0 {
        DiagramKind::Sequence
    } else {
        DiagramKind::Flowchart
    }
}

fn clip(text: &str) -> String {
    let cleaned = workflow::sanitize_label(text);
    if cleaned.chars().count() > MAX_LABEL {
        let mut clipped: String = cleaned.chars().take(MAX_LABEL - 3).collect();
        clipped.push_str("...");
        clipped
    } else {
        cleaned
    }
}

fn detail(element: &CodeElement, include_details: bool) -> String {
    if include_details {
        format!("{}, line {}", element.name, element.line)
    } else {
        element.name.clone()
    }
}

fn flowchart_from_code(analysis: &StructureAnalysis, include_details: bool) -> String {
    let mut out = String::from("flowchart TD\n");
    if include_details {
        let _ = writeln!(
            out,
            "    %% {} elements, complexity {}",
            analysis.elements.len(),
            analysis.complexity
        );
    }
    out.push_str("    Start([Start])\n");
    let mut prev = "Start".to_string();
    let mut next_label: Option<&str> = None;
    let steps = analysis
        .elements
        .iter()
        .filter(|e| e.kind != CodeElementKind::Type && e.kind != CodeElementKind::Call);
    for (idx, element) in steps.enumerate() {
        let id = format!("N{}", idx + 1);
        let text = detail(element, include_details);
        let shape = match element.kind {
            CodeElementKind::Branch => format!("{id}{{{text}}}"),
            CodeElementKind::Loop => format!("{id}[[{text}]]"),
            CodeElementKind::Return => format!("{id}([{text}])"),
            _ => format!("{id}[{text}]"),
        };
        match next_label.take() {
            Some(label) => {
                let _ = writeln!(out, "    {prev} -->|{label}| {shape}");
            }
            None => {
                let _ = writeln!(out, "    {prev} --> {shape}");
            }
        }
        match element.kind {
            CodeElementKind::Branch => {
                let _ = writeln!(out, "    {id} -->|No| End");
                next_label = Some("Yes");
            }
            CodeElementKind::Loop => {
                let _ = writeln!(out, "    {id} -->|repeat| {id}");
            }
            _ => {}
        }
        prev = id;
    }
    match next_label {
        Some(label) => {
            let _ = writeln!(out, "    {prev} -->|{label}| End([End])");
        }
        None => {
            let _ = writeln!(out, "    {prev} --> End([End])");
        }
    }
    out
}

fn sequence_from_code(analysis: &StructureAnalysis, include_details: bool) -> String {
    let mut out = String::from("sequenceDiagram\n    participant Caller\n");
    let calls: Vec<&CodeElement> = analysis
        .elements
        .iter()
        .filter(|e| e.kind == CodeElementKind::Call)
        .collect();
    if calls.is_empty() {
        out.push_str("    participant Module\n");
        for function in analysis
            .elements
            .iter()
            .filter(|e| e.kind == CodeElementKind::Function)
        {
            let _ = writeln!(out, "    Caller->>Module: {}()", function.name);
            if include_details {
                let _ = writeln!(out, "    Note right of Module: line {}", function.line);
            }
            let _ = writeln!(out, "    Module-->>Caller: return");
        }
        return out;
    }

    let mut participants: Vec<&str> = Vec::new();
    for call in &calls {
        let receiver = call.name.split('.').next().unwrap_or("Unknown");
        if !participants.contains(&receiver) {
            participants.push(receiver);
        }
    }
    for participant in &participants {
        let _ = writeln!(out, "    participant {participant}");
    }
    for call in calls {
        let (receiver, method) = call
            .name
            .split_once('.')
            .unwrap_or(("Unknown", call.name.as_str()));
        let _ = writeln!(out, "    Caller->>{receiver}: {method}()");
        if include_details {
            let _ = writeln!(out, "    Note right of {receiver}: line {}", call.line);
        }
        let _ = writeln!(out, "    {receiver}-->>Caller: result");
    }
    out
}

fn class_from_code(analysis: &StructureAnalysis, include_details: bool) -> String {
    let mut out = String::from("classDiagram\n");
    let mut current: Option<(&CodeElement, Vec<&CodeElement>)> = None;
    let mut blocks: Vec<(&CodeElement, Vec<&CodeElement>)> = Vec::new();
    for element in &analysis.elements {
        match element.kind {
            CodeElementKind::Type => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some((element, Vec::new()));
            }
            CodeElementKind::Function => {
                if let Some((owner, methods)) = current.as_mut() {
                    if element.indent > owner.indent {
                        methods.push(element);
                    }
                }
            }
            _ => {}
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    if blocks.is_empty() {
        out.push_str("    class Module {\n");
        for function in analysis
            .elements
            .iter()
            .filter(|e| e.kind == CodeElementKind::Function)
        {
            let _ = writeln!(out, "        +{}()", function.name);
        }
        out.push_str("    }\n");
        return out;
    }
    for (owner, methods) in blocks {
        let _ = writeln!(out, "    class {} {{", owner.name);
        for method in methods {
            let _ = writeln!(out, "        +{}()", method.name);
        }
        out.push_str("    }\n");
        if include_details {
            let _ = writeln!(out, "    note for {} \"defined at line {}\"", owner.name, owner.line);
        }
    }
    out
}

fn state_from_code(analysis: &StructureAnalysis, include_details: bool) -> String {
    let mut out = String::from("stateDiagram-v2\n");
    let states: Vec<&CodeElement> = analysis
        .elements
        .iter()
        .filter(|e| e.kind == CodeElementKind::Function)
        .collect();
    if states.is_empty() {
        out.push_str("    [*] --> Idle\n    Idle --> [*]\n");
        return out;
    }
    if include_details {
        for state in &states {
            let _ = writeln!(out, "    {} : line {}", state.name, state.line);
        }
    }
    let _ = writeln!(out, "    [*] --> {}", states[0].name);
    for pair in states.windows(2) {
        let _ = writeln!(out, "    {} --> {}", pair[0].name, pair[1].name);
    }
    let _ = writeln!(out, "    {} --> [*]", states[states.len() - 1].name);
    out
}

// ---------------------------------------------------------------------------
// Diagram heuristics
// ---------------------------------------------------------------------------

fn complexity_score(scan: &SourceScan) -> usize {
    scan.node_count() + scan.edge_count * 2 + scan.subgraph_count * 3 + scan.max_nesting * 2
}

fn improvements_for(
    scan: &SourceScan,
    source: &str,
    context: Option<&str>,
    audience: Audience,
) -> Vec<Improvement> {
    let mut out = Vec::new();

    if scan.node_count() > 10 && scan.subgraph_count == 0 {
        out.push(Improvement {
            title: "Group related nodes into subgraphs".to_string(),
            priority: Priority::High,
            rationale: format!(
                "{} nodes on one level are hard to scan; grouping shows the structure.",
                scan.node_count()
            ),
            how_to: "Wrap related nodes in `subgraph Name ... end` blocks.".to_string(),
            rewritten: None,
        });
    }

    let unlabeled = scan.unlabeled();
    if scan.kind == DiagramKind::Flowchart && !unlabeled.is_empty() {
        let mut rewritten = source.to_string();
        for id in &unlabeled {
            rewritten = label_first_use(&rewritten, id);
        }
        out.push(Improvement {
            title: "Add descriptive node labels".to_string(),
            priority: Priority::Medium,
            rationale: format!(
                "Nodes without labels render as bare ids: {}.",
                unlabeled.join(", ")
            ),
            how_to: "Give each node a label, e.g. `A[Validate input]`.".to_string(),
            rewritten: Some(rewritten),
        });
    }

    if scan.kind == DiagramKind::Flowchart && !scan.has_direction {
        let rewritten = replace_header(source, "flowchart TD");
        out.push(Improvement {
            title: "Declare an explicit layout direction".to_string(),
            priority: Priority::Low,
            rationale: "An explicit direction keeps the layout stable across renderers."
                .to_string(),
            how_to: "Use `flowchart TD` for top-down or `flowchart LR` for left-right.".to_string(),
            rewritten,
        });
    }

    if !scan.has_styling && scan.node_count() > 3 {
        let priority = match audience {
            Audience::Business | Audience::Documentation => Priority::Medium,
            Audience::Technical | Audience::General => Priority::Low,
        };
        out.push(Improvement {
            title: "Apply consistent styling".to_string(),
            priority,
            rationale: "Colour and shape conventions let readers tell node roles apart."
                .to_string(),
            how_to: "Define `classDef` styles and assign them with `class A,B name`.".to_string(),
            rewritten: None,
        });
    }

    match audience {
        Audience::Technical => out.push(Improvement {
            title: "Annotate edges with data or protocols".to_string(),
            priority: Priority::Medium,
            rationale: "Engineers need to know what flows along each connection.".to_string(),
            how_to: "Add edge labels such as `A -->|HTTP POST| B`.".to_string(),
            rewritten: None,
        }),
        Audience::Business => out.push(Improvement {
            title: "Use business terminology".to_string(),
            priority: Priority::Medium,
            rationale: "Stakeholders follow outcomes, not implementation names.".to_string(),
            how_to: "Rename technical ids in labels to the business step they represent."
                .to_string(),
            rewritten: None,
        }),
        Audience::Documentation => {
            let title = context.map_or_else(|| "Diagram".to_string(), workflow::sanitize_label);
            out.push(Improvement {
                title: "Add a title for the documentation page".to_string(),
                priority: Priority::Low,
                rationale: "Titled diagrams can be referenced from surrounding prose.".to_string(),
                how_to: "Add a front-matter title block before the header.".to_string(),
                rewritten: Some(format!("---\ntitle: {title}\n---\n{source}")),
            });
        }
        Audience::General => {
            if scan.node_count() > 20 {
                out.push(Improvement {
                    title: "Split the diagram".to_string(),
                    priority: Priority::High,
                    rationale: "More than twenty nodes overwhelm a general reader.".to_string(),
                    how_to: "Break the diagram into an overview and detail diagrams.".to_string(),
                    rewritten: None,
                });
            }
        }
    }

    if !scan.has_comments && scan.body_lines > 8 {
        out.push(Improvement {
            title: "Document sections with comments".to_string(),
            priority: Priority::Low,
            rationale: "Comments keep long diagram sources maintainable.".to_string(),
            how_to: "Add `%%` comment lines above each logical section.".to_string(),
            rewritten: None,
        });
    }

    if out.is_empty() {
        out.push(Improvement {
            title: "Diagram follows common conventions".to_string(),
            priority: Priority::Low,
            rationale: "No structural issues were detected.".to_string(),
            how_to: "Keep labels short and consistent as the diagram grows.".to_string(),
            rewritten: None,
        });
    }

    out.sort_by_key(|i| i.priority);
    out
}

/// Add a `[id]` label to the first bare occurrence of `id`.
fn label_first_use(source: &str, id: &str) -> String {
    let mut out = String::with_capacity(source.len() + id.len() + 2);
    let mut done = false;
    for line in source.split_inclusive('\n') {
        if !done && DiagramKind::from_header(line.trim()) == DiagramKind::Unknown {
            for (pos, _) in line.match_indices(id) {
                let before = line[..pos].chars().next_back();
                let after = line[pos + id.len()..].chars().next();
                let bounded = !before.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '|')
                    && !after.is_some_and(|c| {
                        c.is_alphanumeric() || matches!(c, '_' | '[' | '(' | '{' | '>' | '|')
                    });
                if bounded {
                    out.push_str(&line[..pos + id.len()]);
                    let _ = write!(out, "[{id}]");
                    out.push_str(&line[pos + id.len()..]);
                    done = true;
                    break;
                }
            }
            if done {
                continue;
            }
        }
        out.push_str(line);
    }
    out
}

fn replace_header(source: &str, header: &str) -> Option<String> {
    let (line_no, _) = scan::significant_lines(source).next()?;
    let rewritten: Vec<&str> = source
        .lines()
        .enumerate()
        .map(|(idx, line)| if idx + 1 == line_no { header } else { line })
        .collect();
    Some(rewritten.join("\n"))
}

fn validate_source(source: &str, strict: bool) -> Validation {
    let scan = scan::scan(source);
    let mut errors = Vec::new();
    let mut suggestions = Vec::new();
    let mut corrected: Option<String> = None;

    let Some((header_line, header)) = scan.header.clone() else {
        return Validation {
            is_valid: false,
            detected_kind: DiagramKind::Unknown,
            node_count: 0,
            complexity: ComplexityClass::Simple,
            errors: vec![SyntaxIssue {
                line: 1,
                message: "Diagram source is empty".to_string(),
            }],
            suggestions: vec!["Start with a header such as `flowchart TD`.".to_string()],
            corrected: None,
        };
    };

    if scan.kind == DiagramKind::Unknown {
        let word = header.split_whitespace().next().unwrap_or_default();
        errors.push(SyntaxIssue {
            line: header_line,
            message: format!(
                "Unknown diagram type `{word}`; expected one of: {}",
                DiagramKind::accepted_headers()
            ),
        });
        if scan.edge_count > 0 {
            corrected = Some(format!("flowchart TD\n{source}"));
        }
    }

    let mut brackets = BracketBalance::new(scan.kind);
    for (line_no, line) in scan::significant_lines(source) {
        if line_no == header_line && scan.kind != DiagramKind::Unknown {
            continue;
        }
        if let Some(message) = brackets.feed(line_no, line) {
            errors.push(SyntaxIssue { line: line_no, message });
        }
        if line.matches('"').count() % 2 == 1 {
            errors.push(SyntaxIssue {
                line: line_no,
                message: "Unclosed string literal".to_string(),
            });
        }
        if scan::has_dangling_arrow(line) {
            errors.push(SyntaxIssue {
                line: line_no,
                message: "Edge is missing a target node".to_string(),
            });
        }
    }

    errors.extend(brackets.finish());

    if strict {
        let mut needs_fix = false;
        for (idx, raw) in source.lines().enumerate() {
            if raw.starts_with('\t') {
                errors.push(SyntaxIssue {
                    line: idx + 1,
                    message: "Tab indentation; use spaces".to_string(),
                });
                needs_fix = true;
            }
            if raw.trim_end().ends_with(';') {
                errors.push(SyntaxIssue {
                    line: idx + 1,
                    message: "Trailing semicolon".to_string(),
                });
                needs_fix = true;
            }
        }
        if needs_fix {
            let base = corrected.as_deref().unwrap_or(source);
            let fixed: Vec<String> = base
                .lines()
                .map(|l| l.replace('\t', "    ").trim_end().trim_end_matches(';').to_string())
                .collect();
            corrected = Some(fixed.join("\n"));
        }
    }
    errors.sort_by_key(|e| e.line);

    if scan.kind == DiagramKind::Flowchart && !scan.has_direction {
        suggestions.push("Declare a direction, e.g. `flowchart TD`.".to_string());
    }
    if scan.node_count() > 15 && scan.subgraph_count == 0 {
        suggestions.push("Group nodes into subgraphs to improve readability.".to_string());
    }
    if scan.kind == DiagramKind::Flowchart && !scan.unlabeled().is_empty() {
        suggestions.push("Give every node a descriptive label.".to_string());
    }
    if !scan.has_comments {
        suggestions.push("Add `%%` comments to explain non-obvious sections.".to_string());
    }

    Validation {
        is_valid: errors.is_empty(),
        detected_kind: scan.kind,
        node_count: scan.node_count(),
        complexity: ComplexityClass::from_count(scan.node_count()),
        errors,
        suggestions,
        corrected,
    }
}

/// Bracket balance outside string literals and arrow tokens.
///
/// Class, ER and state diagrams open `{ ... }` bodies that close on a later
/// line, so their balance carries over; other kinds must balance per line.
struct BracketBalance {
    spans_lines: bool,
    asymmetric_shapes: bool,
    open: Vec<(char, usize)>,
}

impl BracketBalance {
    fn new(kind: DiagramKind) -> Self {
        Self {
            spans_lines: matches!(kind, DiagramKind::Class | DiagramKind::Er | DiagramKind::State),
            asymmetric_shapes: kind == DiagramKind::Flowchart,
            open: Vec::new(),
        }
    }

    /// Check one line, returning the first problem on it.
    fn feed(&mut self, line_no: usize, line: &str) -> Option<String> {
        for segment in scan::split_arrows(line) {
            let mut in_quotes = false;
            let mut in_label = false;
            let mut prev: Option<char> = None;
            for c in segment.chars() {
                match c {
                    '"' => in_quotes = !in_quotes,
                    _ if in_quotes => {}
                    '|' if self.asymmetric_shapes => in_label = !in_label,
                    '[' | '(' | '{' => self.open.push((c, line_no)),
                    // `id>label]` is the asymmetric node shape.
                    '>' if self.asymmetric_shapes
                        && !in_label
                        && self.open.is_empty()
                        && prev.is_some_and(|p| p.is_alphanumeric() || p == '_') =>
                    {
                        self.open.push((c, line_no));
                    }
                    ']' | ')' | '}' => {
                        let closes = matches!(
                            (self.open.last().map(|(open, _)| *open), c),
                            (Some('[' | '>'), ']') | (Some('('), ')') | (Some('{'), '}')
                        );
                        if !closes {
                            self.open.clear();
                            return Some(format!("Unexpected `{c}`"));
                        }
                        self.open.pop();
                    }
                    _ => {}
                }
                prev = Some(c);
            }
        }
        if self.spans_lines {
            return None;
        }
        let unclosed = self.open.last().map(|(open, _)| unclosed_message(*open));
        self.open.clear();
        unclosed
    }

    /// Blocks still open at the end of the source.
    fn finish(self) -> Option<SyntaxIssue> {
        self.open.first().map(|(open, line)| SyntaxIssue {
            line: *line,
            message: unclosed_message(*open),
        })
    }
}

fn unclosed_message(open: char) -> String {
    format!("Unbalanced brackets: `{open}` is never closed")
}
