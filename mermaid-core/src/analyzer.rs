//! The analyzer capability consumed by the tool handlers.
//!
//! An [`Analyzer`] inspects code and Mermaid source and produces structured
//! results. Handlers only format those results; they never parse diagrams
//! themselves. [`HeuristicAnalyzer`](crate::HeuristicAnalyzer) is the
//! in-process implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::diagram::{
    AnalysisDepth, Audience, ComplexityClass, DiagramKind, RequestedKind, WorkflowFormat,
    WorkflowType,
};
use crate::error::AnalyzerResult;

/// Kind of a structural element found in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeElementKind {
    /// Class, struct, trait or interface.
    Type,
    /// Function or method definition.
    Function,
    /// Conditional branch.
    Branch,
    /// Loop.
    Loop,
    /// Method call on a receiver (`receiver.method(...)`).
    Call,
    /// Return statement.
    Return,
}

/// A structural element found in source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeElement {
    /// What the element is.
    pub kind: CodeElementKind,
    /// Identifier or condition text.
    pub name: String,
    /// 1-based line number.
    pub line: usize,
    /// Indentation width of the line, used to attach methods to types.
    pub indent: usize,
}

/// Result of [`Analyzer::analyze_structure`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureAnalysis {
    /// Diagram kind best suited to the input.
    pub detected_kind: DiagramKind,
    /// Complexity bucket.
    pub complexity: ComplexityClass,
    /// Elements in source order.
    pub elements: Vec<CodeElement>,
}

impl StructureAnalysis {
    /// Number of elements of one kind.
    #[must_use]
    pub fn count(&self, kind: CodeElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind == kind).count()
    }
}

/// Result of [`Analyzer::inspect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    /// Detected diagram kind.
    pub kind: DiagramKind,
    /// Distinct nodes/participants/states.
    pub node_count: usize,
    /// Edges/messages/transitions.
    pub edge_count: usize,
    /// Weighted complexity score.
    pub complexity_score: usize,
    /// Prose summary.
    pub narrative: String,
    /// Recommendations, most important first.
    pub recommendations: Vec<String>,
}

/// Priority of an [`Improvement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Address first.
    High,
    /// Worth doing.
    Medium,
    /// Polish.
    Low,
}

impl Priority {
    /// Capitalised label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// One improvement suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Improvement {
    /// Short title.
    pub title: String,
    /// Priority.
    pub priority: Priority,
    /// Why it matters.
    pub rationale: String,
    /// How to apply it.
    pub how_to: String,
    /// Source with the suggestion applied, when it can be done mechanically.
    pub rewritten: Option<String>,
}

/// A syntax problem at a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxIssue {
    /// 1-based line number.
    pub line: usize,
    /// Description.
    pub message: String,
}

/// Result of [`Analyzer::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    /// No errors were found.
    pub is_valid: bool,
    /// Detected diagram kind.
    pub detected_kind: DiagramKind,
    /// Distinct nodes.
    pub node_count: usize,
    /// Complexity bucket.
    pub complexity: ComplexityClass,
    /// Errors in line order.
    pub errors: Vec<SyntaxIssue>,
    /// Non-blocking suggestions.
    pub suggestions: Vec<String>,
    /// Source with mechanical fixes applied.
    pub corrected: Option<String>,
}

/// Structural analysis, validation and suggestion over diagram text.
///
/// Implementations may call out to remote services, so every operation is
/// async. Errors surface as [`AnalyzerError`](crate::AnalyzerError); an
/// invalid diagram is reported through [`Validation`], not as an error.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze source code and pick a diagram kind for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be analyzed.
    async fn analyze_structure(&self, source: &str) -> AnalyzerResult<StructureAnalysis>;

    /// Produce Mermaid source from an analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if no diagram can be produced.
    async fn generate_source(
        &self,
        analysis: &StructureAnalysis,
        requested: RequestedKind,
        include_details: bool,
    ) -> AnalyzerResult<String>;

    /// Inspect an existing diagram.
    ///
    /// # Errors
    ///
    /// Returns an error if the diagram cannot be inspected.
    async fn inspect(&self, source: &str, depth: AnalysisDepth) -> AnalyzerResult<Inspection>;

    /// Suggest improvements, highest priority first.
    ///
    /// # Errors
    ///
    /// Returns an error if the diagram cannot be inspected.
    async fn suggest_improvements(
        &self,
        source: &str,
        context: Option<&str>,
        audience: Audience,
    ) -> AnalyzerResult<Vec<Improvement>>;

    /// Build a workflow diagram from a prose description.
    ///
    /// # Errors
    ///
    /// Returns an error if no diagram can be produced.
    async fn synthesize_workflow(
        &self,
        description: &str,
        workflow_type: WorkflowType,
        include_decisions: bool,
        format: WorkflowFormat,
    ) -> AnalyzerResult<String>;

    /// Check diagram syntax.
    ///
    /// # Errors
    ///
    /// Returns an error only if validation itself fails.
    async fn validate(&self, source: &str, strict: bool) -> AnalyzerResult<Validation>;
}
