//! # Mermaid Core
//!
//! Shared domain types for the Mermaid MCP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                mermaid-core                 │
//! ├──────────────────────┬──────────────────────┤
//! │  Diagram vocabulary  │  Analyzer contract   │
//! │  - DiagramKind       │  - Analyzer trait    │
//! │  - Workflow kinds    │  - HeuristicAnalyzer │
//! │  - Audience/Depth    │  - Workflow builder  │
//! ├──────────────────────┴──────────────────────┤
//! │  Theme palettes (default/dark/forest/neutral)│
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analyzer;
pub mod diagram;
pub mod error;
pub mod heuristic;
pub mod scan;
pub mod theme;
pub mod workflow;

pub use analyzer::{
    Analyzer, CodeElement, CodeElementKind, Improvement, Inspection, Priority, StructureAnalysis,
    SyntaxIssue, Validation,
};
pub use diagram::{
    AnalysisDepth, Audience, ComplexityClass, DiagramKind, RequestedKind, WorkflowFormat,
    WorkflowType,
};
pub use error::{AnalyzerError, AnalyzerResult};
pub use heuristic::HeuristicAnalyzer;
pub use theme::{Theme, ThemePalette};

/// Mermaid core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
