//! Output documents and their input sources

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{ExportAction, OperationConfig};

/// One generated document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateWordFile {
    /// Output document path
    #[serde(rename = "fn")]
    pub file_name: PathBuf,

    /// Template document to copy and append to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_template_fn: Option<PathBuf>,

    /// Log the style names available in the document
    pub list_styles: bool,

    /// Input sources, processed in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<InputSource>,

    /// Untagged OpenAPI sources, processed after `sources`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub read_open_api_files: Vec<OpenApiSource>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub read_rail_road_files: Vec<TextSource>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub read_grammar_files: Vec<TextSource>,
}

impl CreateWordFile {
    /// Every source in processing order: tagged sources, then the
    /// OpenAPI, railroad and grammar lists
    pub fn all_sources(&self) -> Vec<InputSource> {
        let mut all = self.sources.clone();
        all.extend(self.read_open_api_files.iter().cloned().map(InputSource::OpenApi));
        all.extend(self.read_rail_road_files.iter().cloned().map(InputSource::RailRoad));
        all.extend(self.read_grammar_files.iter().cloned().map(InputSource::Grammar));
        all
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_name.as_os_str().is_empty() {
            return Err(anyhow!("Output file name cannot be empty"));
        }

        if let Some(template) = &self.use_template_fn {
            if template.as_os_str().is_empty() {
                return Err(anyhow!(
                    "Template file name for {} cannot be empty",
                    self.file_name.display()
                ));
            }
        }

        for source in self.all_sources() {
            source.validate()?;
        }

        Ok(())
    }
}

/// Input source types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputSource {
    /// OpenAPI description in YAML
    #[serde(alias = "openapi")]
    OpenApi(OpenApiSource),

    /// Railroad diagram text
    #[serde(alias = "railroad")]
    RailRoad(TextSource),

    /// Grammar text rendered by an external tool
    Grammar(TextSource),
}

impl InputSource {
    pub fn file_name(&self) -> &PathBuf {
        match self {
            InputSource::OpenApi(s) => &s.file_name,
            InputSource::RailRoad(s) | InputSource::Grammar(s) => &s.file_name,
        }
    }

    pub fn skip(&self) -> bool {
        match self {
            InputSource::OpenApi(s) => s.skip,
            InputSource::RailRoad(s) | InputSource::Grammar(s) => s.skip,
        }
    }

    pub fn actions(&self) -> &[ExportAction] {
        match self {
            InputSource::OpenApi(s) => &s.actions,
            InputSource::RailRoad(s) | InputSource::Grammar(s) => &s.actions,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            InputSource::OpenApi(_) => "open_api",
            InputSource::RailRoad(_) => "rail_road",
            InputSource::Grammar(_) => "grammar",
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_name().as_os_str().is_empty() {
            return Err(anyhow!("{} source file name cannot be empty", self.kind_name()));
        }
        Ok(())
    }
}

/// OpenAPI source configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenApiSource {
    #[serde(rename = "fn")]
    pub file_name: PathBuf,

    pub skip: bool,

    /// Log every operation id found in the file
    pub list_operations: bool,

    pub actions: Vec<ExportAction>,

    /// Operations to document, by operation id, with their overrides
    pub use_operations: IndexMap<String, OperationConfig>,
}

/// Railroad or grammar text source configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSource {
    #[serde(rename = "fn")]
    pub file_name: PathBuf,

    pub skip: bool,

    /// Log the names of all parts found in the file
    pub list_names: bool,

    pub actions: Vec<ExportAction>,
}
