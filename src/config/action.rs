//! Export actions attached to an input source

use serde::{Deserialize, Serialize};

/// What an action does, derived from its case-insensitive name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Paragraph,
    Overview,
    Tables,
    Yaml,
    Schemas,
    Patterns,
    RailRoad,
    Grammar,
}

impl ActionKind {
    /// Parse an action name such as `ExportTables`, `export-schemas` or `para`.
    /// Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        let norm: String = name
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        let norm = norm.strip_prefix("export").unwrap_or(&norm);

        match norm {
            "para" | "paragraph" => Some(ActionKind::Paragraph),
            "overview" => Some(ActionKind::Overview),
            "table" | "tables" => Some(ActionKind::Tables),
            "yaml" => Some(ActionKind::Yaml),
            "schema" | "schemas" => Some(ActionKind::Schemas),
            "pattern" | "patterns" => Some(ActionKind::Patterns),
            "railroad" => Some(ActionKind::RailRoad),
            "grammar" => Some(ActionKind::Grammar),
            _ => None,
        }
    }
}

/// How grammar renderings are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Print the rendering to the console only
    #[serde(alias = "Console", alias = "CONSOLE")]
    Console,

    /// Write an SVG file next to the document
    #[serde(alias = "Svg", alias = "SVG")]
    Svg,

    /// Embed the text rendering as code lines
    #[default]
    #[serde(alias = "Utf8", alias = "UTF8")]
    Utf8,
}

/// One step of a source's action list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportAction {
    /// Action name, e.g. `ExportTables`
    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub para_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub para_style: Option<String>,

    /// Emit the operation re-serialised as YAML
    pub yaml_as_source: bool,

    /// Emit the HTTP description table
    pub yaml_as_table: bool,

    /// Skip operations or schemas an earlier action already emitted
    pub skip_if_visited: bool,

    /// Schemas that are documented but not expanded during discovery
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schema_not_follow: Vec<String>,

    /// Seed schemas for discovery
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_schemas: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppress_schemas: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppress_members: Vec<String>,

    /// Named parts of a railroad or grammar source; empty selects all
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<String>,

    pub output_format: OutputFormat,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Font size of code paragraphs, in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// Width of an embedded diagram, overriding the document-wide width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_width_cm: Option<f64>,

    /// Height cut off the bottom of an embedded diagram
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_bottom_cm: Option<f64>,
}

impl ExportAction {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> Option<ActionKind> {
        ActionKind::parse(&self.action)
    }
}
