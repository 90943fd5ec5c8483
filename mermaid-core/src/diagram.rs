//! Closed vocabularies shared by the tools.
//!
//! Enumerations that carry a declared default resolve unknown names to that
//! default. [`WorkflowType`] has no default and returns `None` instead.

use serde::{Deserialize, Serialize};

/// Kind of a Mermaid diagram, detected from its header keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    /// `flowchart` / `graph`.
    Flowchart,
    /// `sequenceDiagram`.
    Sequence,
    /// `classDiagram`.
    Class,
    /// `stateDiagram` / `stateDiagram-v2`.
    State,
    /// `erDiagram`.
    Er,
    /// `gantt`.
    Gantt,
    /// `pie`.
    Pie,
    /// `journey`.
    Journey,
    /// `mindmap`.
    Mindmap,
    /// `timeline`.
    Timeline,
    /// `gitGraph`.
    GitGraph,
    /// No recognised header.
    Unknown,
}

impl DiagramKind {
    /// Header keywords in match order. Longer keywords come first where one
    /// is a prefix of another.
    const HEADERS: [(&'static str, DiagramKind); 12] = [
        ("flowchart", DiagramKind::Flowchart),
        ("graph", DiagramKind::Flowchart),
        ("sequenceDiagram", DiagramKind::Sequence),
        ("classDiagram", DiagramKind::Class),
        ("stateDiagram", DiagramKind::State),
        ("erDiagram", DiagramKind::Er),
        ("gantt", DiagramKind::Gantt),
        ("pie", DiagramKind::Pie),
        ("journey", DiagramKind::Journey),
        ("mindmap", DiagramKind::Mindmap),
        ("timeline", DiagramKind::Timeline),
        ("gitGraph", DiagramKind::GitGraph),
    ];

    /// Detect the kind from a header line such as `flowchart TD`.
    #[must_use]
    pub fn from_header(line: &str) -> Self {
        let word = line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches(':');
        Self::HEADERS
            .iter()
            .find(|(keyword, _)| {
                word == *keyword
                    || (word.starts_with(keyword) && word[keyword.len()..].starts_with('-'))
            })
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }

    /// Canonical header keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequenceDiagram",
            Self::Class => "classDiagram",
            Self::State => "stateDiagram-v2",
            Self::Er => "erDiagram",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::Journey => "journey",
            Self::Mindmap => "mindmap",
            Self::Timeline => "timeline",
            Self::GitGraph => "gitGraph",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequence",
            Self::Class => "class",
            Self::State => "state",
            Self::Er => "entity-relationship",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::Journey => "user journey",
            Self::Mindmap => "mindmap",
            Self::Timeline => "timeline",
            Self::GitGraph => "git graph",
            Self::Unknown => "unknown",
        }
    }

    /// Comma separated list of accepted header keywords.
    #[must_use]
    pub fn accepted_headers() -> String {
        Self::HEADERS
            .iter()
            .map(|(keyword, _)| *keyword)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Diagram kind requested from code generation (`diagram_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedKind {
    /// Let the analyzer choose.
    #[default]
    Auto,
    /// Control-flow chart.
    Flowchart,
    /// Call sequence.
    Sequence,
    /// Class structure.
    Class,
    /// State machine.
    State,
}

impl RequestedKind {
    /// Resolve by name, falling back to [`RequestedKind::Auto`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "flowchart" => Self::Flowchart,
            "sequence" => Self::Sequence,
            "class" => Self::Class,
            "state" => Self::State,
            _ => Self::Auto,
        }
    }
}

/// Complexity bucket for a diagram or code fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityClass {
    /// Five elements or fewer.
    Simple,
    /// Up to fifteen elements.
    Moderate,
    /// More than fifteen elements.
    Complex,
}

impl ComplexityClass {
    /// Bucket an element count.
    #[must_use]
    pub const fn from_count(count: usize) -> Self {
        if count <= 5 {
            Self::Simple
        } else if count <= 15 {
            Self::Moderate
        } else {
            Self::Complex
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

impl std::fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How deep `analyze_diagram_structure` should go (`analysis_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    /// Element inventory only.
    Structure,
    /// Complexity metrics.
    Complexity,
    /// Optimization recommendations.
    Optimization,
    /// Everything.
    #[default]
    Full,
}

impl AnalysisDepth {
    /// Resolve by name, falling back to [`AnalysisDepth::Full`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "structure" => Self::Structure,
            "complexity" => Self::Complexity,
            "optimization" => Self::Optimization,
            _ => Self::Full,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Complexity => "complexity",
            Self::Optimization => "optimization",
            Self::Full => "full",
        }
    }

    /// Whether structural inventory is included.
    #[must_use]
    pub const fn includes_structure(self) -> bool {
        matches!(self, Self::Structure | Self::Full)
    }

    /// Whether complexity metrics are included.
    #[must_use]
    pub const fn includes_complexity(self) -> bool {
        matches!(self, Self::Complexity | Self::Full)
    }

    /// Whether recommendations are included.
    #[must_use]
    pub const fn includes_optimization(self) -> bool {
        matches!(self, Self::Optimization | Self::Full)
    }
}

/// Target audience for improvement suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Engineers.
    Technical,
    /// Stakeholders without engineering background.
    Business,
    /// Anyone.
    #[default]
    General,
    /// Written documentation.
    Documentation,
}

impl Audience {
    /// Resolve by name, falling back to [`Audience::General`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "technical" => Self::Technical,
            "business" => Self::Business,
            "documentation" => Self::Documentation,
            _ => Self::General,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Business => "business",
            Self::General => "general",
            Self::Documentation => "documentation",
        }
    }
}

/// Kind of workflow to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    /// Branch, review and merge.
    Git,
    /// Build, test and deploy pipeline.
    Cicd,
    /// Request and approval process.
    Business,
    /// Software development lifecycle.
    Development,
    /// Release rollout.
    Deployment,
}

impl WorkflowType {
    /// Resolve by name. There is no default workflow type.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "git" => Some(Self::Git),
            "cicd" => Some(Self::Cicd),
            "business" => Some(Self::Business),
            "development" => Some(Self::Development),
            "deployment" => Some(Self::Deployment),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Cicd => "cicd",
            Self::Business => "business",
            Self::Development => "development",
            Self::Deployment => "deployment",
        }
    }
}

/// Output shape for workflow synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowFormat {
    /// Decision-branching flowchart.
    #[default]
    Flowchart,
    /// Actor message exchange.
    Sequence,
    /// State machine.
    State,
    /// Schedule.
    Gantt,
}

impl WorkflowFormat {
    /// Resolve by name, falling back to [`WorkflowFormat::Flowchart`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "sequence" => Self::Sequence,
            "state" => Self::State,
            "gantt" => Self::Gantt,
            _ => Self::Flowchart,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequence",
            Self::State => "state",
            Self::Gantt => "gantt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_detection() {
        assert_eq!(DiagramKind::from_header("flowchart TD"), DiagramKind::Flowchart);
        assert_eq!(DiagramKind::from_header("graph LR"), DiagramKind::Flowchart);
        assert_eq!(DiagramKind::from_header("sequenceDiagram"), DiagramKind::Sequence);
        assert_eq!(DiagramKind::from_header("stateDiagram-v2"), DiagramKind::State);
        assert_eq!(DiagramKind::from_header("gantt"), DiagramKind::Gantt);
        assert_eq!(DiagramKind::from_header("graphviz"), DiagramKind::Unknown);
        assert_eq!(DiagramKind::from_header("A --> B"), DiagramKind::Unknown);
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(RequestedKind::from_name("bogus"), RequestedKind::Auto);
        assert_eq!(AnalysisDepth::from_name("bogus"), AnalysisDepth::Full);
        assert_eq!(Audience::from_name("bogus"), Audience::General);
        assert_eq!(WorkflowFormat::from_name("bogus"), WorkflowFormat::Flowchart);
        assert_eq!(WorkflowType::from_name("bogus"), None);
        assert_eq!(WorkflowType::from_name("cicd"), Some(WorkflowType::Cicd));
    }

    #[test]
    fn test_complexity_buckets() {
        assert_eq!(ComplexityClass::from_count(0), ComplexityClass::Simple);
        assert_eq!(ComplexityClass::from_count(5), ComplexityClass::Simple);
        assert_eq!(ComplexityClass::from_count(6), ComplexityClass::Moderate);
        assert_eq!(ComplexityClass::from_count(15), ComplexityClass::Moderate);
        assert_eq!(ComplexityClass::from_count(16), ComplexityClass::Complex);
    }
}
