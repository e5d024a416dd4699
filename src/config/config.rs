//! Main configuration structure and implementation

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use yaml2docx_docx::cm_to_twips;

use super::{CreateWordFile, GlobalReplacements, ParameterInfoList};

const DEFAULT_TABLE_WIDTHS: [f64; 5] = [3.0, 6.0, 1.0, 4.0, 1.0];
const DEFAULT_OVERVIEW_WIDTHS: [f64; 3] = [4.0, 8.0, 4.0];
const DEFAULT_FIVE_COLUMN_WIDTHS: [f64; 5] = [2.5, 4.5, 2.0, 3.0, 3.0];
const DEFAULT_THREE_COLUMN_WIDTHS: [f64; 3] = [3.0, 8.0, 4.0];
const DEFAULT_SCHEMA_WIDTHS: [f64; 6] = [3.5, 5.5, 3.0, 1.2, 1.3, 2.5];
const DEFAULT_PATTERN_WIDTHS: [f64; 2] = [1.5, 15.5];

/// Document-wide export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Heading prefix of interface operation sections, followed by the operation id
    pub table_heading_prefix: String,

    /// Body text before an interface operation table; `%opid%` and `%table%` are replaced
    pub body: String,

    pub schema_heading_prefix: String,

    /// Body text before a schema table; `%schema%` and `%table%` are replaced
    pub schema_body: String,

    /// Heading prefix of HTTP description sections
    pub yaml_heading_prefix: String,

    /// Sequence label of table captions
    pub caption_label: String,

    /// Text between caption number and caption text
    pub caption_separator: String,

    pub table_caption_prefix: String,
    pub overview_table_caption_prefix: String,
    pub yaml_table_caption_prefix: String,
    pub schema_table_caption_prefix: String,
    pub pattern_table_caption_prefix: String,

    pub heading2_style: String,
    pub table_heading_style: String,
    pub schema_heading_style: String,
    pub body_style: String,
    pub note_style: String,
    pub table_caption_style: String,
    pub yaml_heading_style: String,
    pub yaml_code_style: String,
    pub grammar_heading_style: String,
    pub grammar_code_style: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaml_code_font_size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_code_font_size: Option<f64>,

    /// Width of embedded grammar diagrams
    pub grammar_code_target_width_cm: f64,

    /// Diagrams taller than this are shrunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_code_max_height_cm: Option<f64>,

    /// External command rendering grammar text as UTF-8 railroad diagrams
    pub docker_build_text_cmd: String,
    pub docker_build_text_args: String,

    /// External command rendering grammar text as SVG
    pub docker_build_svg_cmd: String,
    pub docker_build_svg_args: String,

    /// External command converting an SVG file into a PNG file;
    /// `%in-fn%` and `%out-fn%` name the files inside the working directory
    #[serde(alias = "dockerSvg2BitmapCmd")]
    pub docker_svg2bitmap_cmd: String,
    #[serde(alias = "dockerSvgBitmapfArgs")]
    pub docker_svg2bitmap_args: String,

    /// Table border width in eighths of a point
    pub table_cell_border_width: u32,

    /// Border around YAML source blocks, in eighths of a point; zero for none
    pub yaml_mono_border_width: u32,

    /// Blank paragraphs after each table
    pub number_empty_lines: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_column_width_cm: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview_column_width_cm: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_op_five_column_width_cm: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_op_three_column_width_cm: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_column_width_cm: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_column_width_cm: Option<Vec<f64>>,

    pub add_table_captions: bool,

    /// Inputs listed for every operation
    pub inputs: ParameterInfoList,

    /// Outputs listed for every operation
    pub outputs: ParameterInfoList,

    /// Inputs removed when an operation has no suppression list of its own
    pub suppress_inputs: Vec<String>,
    pub suppress_outputs: Vec<String>,

    /// Origin schemas in the order their members are listed
    pub origin_schema_order: Vec<String>,

    /// Schemas never documented on their own
    pub suppress_schema_names: Vec<String>,

    /// Longer patterns go to the pattern table
    pub pattern_inline_limit: usize,

    /// Replacement rules `where|how|from|to`
    pub global_replacements: Vec<String>,

    pub create_word_files: Vec<CreateWordFile>,

    #[serde(skip)]
    pub reps: GlobalReplacements,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            table_heading_prefix: "Interface operation ".to_string(),
            body: "The interface operation %opid% is specified in %table%.".to_string(),
            schema_heading_prefix: "Schema ".to_string(),
            schema_body: "The schema %schema% is specified in %table%.".to_string(),
            yaml_heading_prefix: "HTTP operation ".to_string(),
            caption_label: "Table".to_string(),
            caption_separator: " \u{2013} ".to_string(),
            table_caption_prefix: "Interface operation ".to_string(),
            overview_table_caption_prefix: "Overview of interface operations".to_string(),
            yaml_table_caption_prefix: "HTTP operation ".to_string(),
            schema_table_caption_prefix: "Schema ".to_string(),
            pattern_table_caption_prefix: "Patterns".to_string(),
            heading2_style: "Heading 2".to_string(),
            table_heading_style: "Heading 3".to_string(),
            schema_heading_style: "Heading 3".to_string(),
            body_style: "Normal".to_string(),
            note_style: "Normal".to_string(),
            table_caption_style: "Caption".to_string(),
            yaml_heading_style: "Heading 3".to_string(),
            yaml_code_style: "Normal".to_string(),
            grammar_heading_style: "Heading 3".to_string(),
            grammar_code_style: "Normal".to_string(),
            yaml_code_font_size: Some(8.0),
            grammar_code_font_size: None,
            grammar_code_target_width_cm: 16.0,
            grammar_code_max_height_cm: Some(22.0),
            docker_build_text_cmd: "docker".to_string(),
            docker_build_text_args: r#"run --rm -i -v ".:/data" kgt -l iso-ebnf -e rrutf8"#
                .to_string(),
            docker_build_svg_cmd: "docker".to_string(),
            docker_build_svg_args: r#"run --rm -i -v ".:/data" kgt -l iso-ebnf -e svg"#
                .to_string(),
            docker_svg2bitmap_cmd: "docker".to_string(),
            docker_svg2bitmap_args: concat!(
                r#"run --rm -v "%wd%:/data" -w /data homi/librsvg --background-color=white "#,
                r#"--width=4000px -f png -o "%out-fn%" "%in-fn%""#
            )
            .to_string(),
            table_cell_border_width: 8,
            yaml_mono_border_width: 8,
            number_empty_lines: 1,
            table_column_width_cm: None,
            overview_column_width_cm: None,
            interface_op_five_column_width_cm: None,
            interface_op_three_column_width_cm: None,
            schema_column_width_cm: None,
            pattern_column_width_cm: None,
            add_table_captions: true,
            inputs: ParameterInfoList::new(),
            outputs: ParameterInfoList::new(),
            suppress_inputs: Vec::new(),
            suppress_outputs: Vec::new(),
            origin_schema_order: Vec::new(),
            suppress_schema_names: Vec::new(),
            pattern_inline_limit: 80,
            global_replacements: Vec::new(),
            create_word_files: Vec::new(),
            reps: GlobalReplacements::new(),
            base_dir: None,
        }
    }
}

impl ExportConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf);
        Self::from_yaml_str(&content, base_dir)
            .with_context(|| format!("Invalid configuration {}", path.display()))
    }

    /// Parse configuration text; relative paths resolve against `base_dir`
    pub fn from_yaml_str(content: &str, base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config: ExportConfig = serde_yaml::from_str(content)?;
        config.base_dir = base_dir;
        config.parse_replacements();
        config.validate()?;
        Ok(config)
    }

    /// Build the replacement rules from `global_replacements`.
    /// Returns the success count minus the failure count.
    pub fn parse_replacements(&mut self) -> i32 {
        let mut reps = GlobalReplacements::new();
        let count = reps.parse_lines(&self.global_replacements[..]);
        let failed = self.global_replacements.len() as i32 - reps.len() as i32;
        if failed > 0 {
            warn!(
                "{} of {} global replacement rules could not be parsed",
                failed,
                self.global_replacements.len()
            );
        }
        debug!("Parsed global replacements with count {}", count);
        self.reps = reps;
        count
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let widths = [
            ("tableColumnWidthCm", &self.table_column_width_cm),
            ("overviewColumnWidthCm", &self.overview_column_width_cm),
            ("interfaceOpFiveColumnWidthCm", &self.interface_op_five_column_width_cm),
            ("interfaceOpThreeColumnWidthCm", &self.interface_op_three_column_width_cm),
            ("schemaColumnWidthCm", &self.schema_column_width_cm),
            ("patternColumnWidthCm", &self.pattern_column_width_cm),
        ];
        for (name, list) in widths {
            if let Some(list) = list {
                if list.iter().any(|w| !w.is_finite() || *w <= 0.0) {
                    return Err(anyhow!("{} must only contain positive widths", name));
                }
            }
        }

        if !self.grammar_code_target_width_cm.is_finite() || self.grammar_code_target_width_cm <= 0.0 {
            return Err(anyhow!("grammarCodeTargetWidthCm must be positive"));
        }

        if self.pattern_inline_limit == 0 {
            return Err(anyhow!("patternInlineLimit must be greater than zero"));
        }

        for file in &self.create_word_files {
            file.validate()?;
        }

        Ok(())
    }

    /// Expand `~` and environment variables, then resolve against the
    /// configuration directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        let raw = path.to_string_lossy();
        let expanded = match shellexpand::full(&raw) {
            Ok(s) => s.into_owned(),
            Err(e) => {
                debug!("Could not expand {}: {}", raw, e);
                shellexpand::tilde(&raw).into_owned()
            }
        };

        let expanded = PathBuf::from(expanded);
        match &self.base_dir {
            Some(base) if expanded.is_relative() => base.join(expanded),
            _ => expanded,
        }
    }

    pub fn table_widths(&self) -> Vec<u32> {
        widths_twips("tableColumnWidthCm", &self.table_column_width_cm, &DEFAULT_TABLE_WIDTHS)
    }

    pub fn overview_widths(&self) -> Vec<u32> {
        widths_twips(
            "overviewColumnWidthCm",
            &self.overview_column_width_cm,
            &DEFAULT_OVERVIEW_WIDTHS,
        )
    }

    pub fn five_column_widths(&self) -> Vec<u32> {
        widths_twips(
            "interfaceOpFiveColumnWidthCm",
            &self.interface_op_five_column_width_cm,
            &DEFAULT_FIVE_COLUMN_WIDTHS,
        )
    }

    pub fn three_column_widths(&self) -> Vec<u32> {
        widths_twips(
            "interfaceOpThreeColumnWidthCm",
            &self.interface_op_three_column_width_cm,
            &DEFAULT_THREE_COLUMN_WIDTHS,
        )
    }

    pub fn schema_widths(&self) -> Vec<u32> {
        widths_twips("schemaColumnWidthCm", &self.schema_column_width_cm, &DEFAULT_SCHEMA_WIDTHS)
    }

    pub fn pattern_widths(&self) -> Vec<u32> {
        widths_twips(
            "patternColumnWidthCm",
            &self.pattern_column_width_cm,
            &DEFAULT_PATTERN_WIDTHS,
        )
    }
}

/// Configured widths in twips; a list with the wrong column count falls back
/// to the defaults
fn widths_twips(name: &str, configured: &Option<Vec<f64>>, default: &[f64]) -> Vec<u32> {
    let cm: &[f64] = match configured {
        Some(list) if list.len() == default.len() => list,
        Some(list) => {
            warn!(
                "{} has {} entries but the table has {} columns; using defaults",
                name,
                list.len(),
                default.len()
            );
            default
        }
        None => default,
    };
    cm.iter().map(|w| cm_to_twips(*w)).collect()
}
