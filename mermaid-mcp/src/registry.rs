//! Static tool catalog.
//!
//! Every tool is described once, here. The same descriptors drive
//! `tools/list` (via [`ToolDescriptor::input_schema`]) and argument
//! destructuring (via [`ToolArgs`](crate::args::ToolArgs)), so the schema a
//! caller sees is the schema that gets enforced.

use serde_json::{json, Map, Value};

use crate::server::Tool;

/// Registered tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// `generate_diagram_from_code`
    GenerateDiagramFromCode,
    /// `analyze_diagram_structure`
    AnalyzeDiagramStructure,
    /// `suggest_diagram_improvements`
    SuggestDiagramImprovements,
    /// `create_workflow_diagram`
    CreateWorkflowDiagram,
    /// `export_diagram_formats`
    ExportDiagramFormats,
    /// `validate_diagram_syntax`
    ValidateDiagramSyntax,
}

impl ToolName {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GenerateDiagramFromCode => "generate_diagram_from_code",
            Self::AnalyzeDiagramStructure => "analyze_diagram_structure",
            Self::SuggestDiagramImprovements => "suggest_diagram_improvements",
            Self::CreateWorkflowDiagram => "create_workflow_diagram",
            Self::ExportDiagramFormats => "export_diagram_formats",
            Self::ValidateDiagramSyntax => "validate_diagram_syntax",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// JSON string.
    String,
    /// JSON boolean.
    Boolean,
    /// Positive JSON integer.
    Integer,
}

impl ParamType {
    /// JSON Schema type name.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
        }
    }
}

/// Declared default of an optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    /// String default.
    Str(&'static str),
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Int(u32),
}

impl ParamDefault {
    fn to_json(self) -> Value {
        match self {
            Self::Str(s) => json!(s),
            Self::Bool(b) => json!(b),
            Self::Int(n) => json!(n),
        }
    }
}

/// One parameter of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Argument name.
    pub name: &'static str,
    /// JSON type.
    pub ty: ParamType,
    /// Human description.
    pub description: &'static str,
    /// Whether the caller must supply it.
    pub required: bool,
    /// Closed set of accepted values; empty when open.
    pub allowed: &'static [&'static str],
    /// Value substituted when the argument is absent.
    pub default: Option<ParamDefault>,
}

const fn param(name: &'static str, ty: ParamType, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        ty,
        description,
        required: false,
        allowed: &[],
        default: None,
    }
}

impl ParamSpec {
    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    const fn with_default(mut self, value: ParamDefault) -> Self {
        self.default = Some(value);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.ty.json_type()));
        schema.insert("description".into(), json!(self.description));
        if !self.allowed.is_empty() {
            schema.insert("enum".into(), json!(self.allowed));
        }
        if let Some(default) = self.default {
            schema.insert("default".into(), default.to_json());
        }
        if self.ty == ParamType::Integer {
            schema.insert("minimum".into(), json!(1));
        }
        Value::Object(schema)
    }
}

/// A registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: ToolName,
    /// Human description.
    pub description: &'static str,
    /// Parameters in declaration order.
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    /// Look up a parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// JSON Schema for the tool's arguments.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Listing entry for `tools/list`.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.as_str().to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

const DIAGRAM_CODE: ParamSpec =
    param("diagram_code", ParamType::String, "Mermaid diagram source").required();

const THEMES: &[&str] = &["default", "dark", "forest", "neutral"];

static CATALOG: [ToolDescriptor; 6] = [
    ToolDescriptor {
        name: ToolName::GenerateDiagramFromCode,
        description: "Generate a Mermaid diagram from source code by scanning its functions, branches, loops, types and calls",
        params: &[
            param("code", ParamType::String, "Source code to visualize").required(),
            param("diagram_type", ParamType::String, "Kind of diagram to generate")
                .one_of(&["flowchart", "sequence", "class", "state", "auto"])
                .with_default(ParamDefault::Str("auto")),
            param("language", ParamType::String, "Programming language of the code"),
            param(
                "include_details",
                ParamType::Boolean,
                "Annotate nodes with names and line numbers",
            )
            .with_default(ParamDefault::Bool(false)),
        ],
    },
    ToolDescriptor {
        name: ToolName::AnalyzeDiagramStructure,
        description: "Analyze the structure and complexity of a Mermaid diagram",
        params: &[
            DIAGRAM_CODE,
            param("analysis_type", ParamType::String, "Depth of the analysis")
                .one_of(&["structure", "complexity", "optimization", "full"])
                .with_default(ParamDefault::Str("full")),
        ],
    },
    ToolDescriptor {
        name: ToolName::SuggestDiagramImprovements,
        description: "Suggest prioritized improvements to a Mermaid diagram for a given audience",
        params: &[
            DIAGRAM_CODE,
            param("context", ParamType::String, "What the diagram is used for"),
            param("audience", ParamType::String, "Intended readers")
                .one_of(&["technical", "business", "general", "documentation"])
                .with_default(ParamDefault::Str("general")),
        ],
    },
    ToolDescriptor {
        name: ToolName::CreateWorkflowDiagram,
        description: "Create a workflow diagram from a natural-language description",
        params: &[
            param(
                "workflow_description",
                ParamType::String,
                "Description of the workflow",
            )
            .required(),
            param("workflow_type", ParamType::String, "Kind of workflow")
                .required()
                .one_of(&["git", "cicd", "business", "development", "deployment"]),
            param(
                "include_decision_points",
                ParamType::Boolean,
                "Add a decision branch with a failure path",
            )
            .with_default(ParamDefault::Bool(true)),
            param("format", ParamType::String, "Diagram shape")
                .one_of(&["flowchart", "sequence", "state", "gantt"])
                .with_default(ParamDefault::Str("flowchart")),
        ],
    },
    ToolDescriptor {
        name: ToolName::ExportDiagramFormats,
        description: "Export a Mermaid diagram to SVG, PNG, PDF or HTML, either to a file or inline as base64",
        params: &[
            DIAGRAM_CODE,
            param("format", ParamType::String, "Export format")
                .required()
                .one_of(&["svg", "png", "pdf", "html"]),
            param(
                "output_path",
                ParamType::String,
                "File to write; omit to receive base64 data",
            ),
            param("theme", ParamType::String, "Colour theme")
                .one_of(THEMES)
                .with_default(ParamDefault::Str("default")),
            param("width", ParamType::Integer, "Raster width in pixels")
                .with_default(ParamDefault::Int(mermaid_renderer::DEFAULT_WIDTH)),
            param("height", ParamType::Integer, "Raster height in pixels")
                .with_default(ParamDefault::Int(mermaid_renderer::DEFAULT_HEIGHT)),
        ],
    },
    ToolDescriptor {
        name: ToolName::ValidateDiagramSyntax,
        description: "Validate Mermaid syntax and report line-numbered errors with an optional corrected version",
        params: &[
            DIAGRAM_CODE,
            param(
                "strict_mode",
                ParamType::Boolean,
                "Also flag style problems such as tabs and trailing semicolons",
            )
            .with_default(ParamDefault::Bool(false)),
            param(
                "provide_suggestions",
                ParamType::Boolean,
                "Include fix suggestions in the report",
            )
            .with_default(ParamDefault::Bool(true)),
        ],
    },
];

/// The set of tools served by this process.
#[derive(Debug, Clone, Copy)]
pub struct ToolRegistry {
    tools: &'static [ToolDescriptor],
}

impl ToolRegistry {
    /// The six Mermaid tools.
    #[must_use]
    pub const fn standard() -> Self {
        Self { tools: &CATALOG }
    }

    /// All descriptors in catalog order.
    #[must_use]
    pub const fn list(&self) -> &'static [ToolDescriptor] {
        self.tools
    }

    /// Resolve a tool by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&'static ToolDescriptor> {
        self.tools.iter().find(|t| t.name.as_str() == name)
    }

    /// Listing entries for `tools/list`.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
