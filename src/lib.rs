//! Yaml2Docx Library
//!
//! Exports OpenAPI descriptions written in YAML, together with a YAML
//! export configuration, into Word documents: interface operation tables,
//! HTTP response tables, flattened schema tables and supporting text.

pub mod cli;
pub mod config;
pub mod grammar;
pub mod openapi;
pub mod render;
pub mod utils;

pub use config::{CreateWordFile, ExportAction, ExportConfig, InputSource};
pub use openapi::{OpenApiDocument, SchemaResolver};
pub use render::{DocumentState, RenderContext};

use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use yaml2docx_docx::{DocumentSink, DocxWriter};

use config::{ActionKind, OpenApiSource, TextSource};
use grammar::{PartSyntax, TextParts};
use openapi::{build_operation_view, lister};
use render::operation::OverviewEntry;
use render::{http, operation, schema, text};

/// Main application context driving one export run
pub struct Yaml2Docx {
    config: ExportConfig,
}

/// Operations and schemas already documented in this run
#[derive(Debug, Default)]
pub struct VisitedSets {
    pub operations: HashSet<String>,
    pub schemas: HashSet<String>,
}

impl Yaml2Docx {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a file and create the application
    pub fn from_config_file(path: &Path) -> Yaml2DocxResult<Self> {
        let config = ExportConfig::from_file(path).map_err(|e| Yaml2DocxError::Config(format!("{:#}", e)))?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Output files selected by `only`, matched against the configured
    /// file name or its final component
    pub fn selected_files(&self, only: Option<&str>) -> Yaml2DocxResult<Vec<&CreateWordFile>> {
        let files: Vec<&CreateWordFile> = self
            .config
            .create_word_files
            .iter()
            .filter(|f| match only {
                None => true,
                Some(name) => {
                    f.file_name == Path::new(name)
                        || f.file_name.file_name().is_some_and(|n| n == name)
                }
            })
            .collect();

        if files.is_empty() {
            return Err(Yaml2DocxError::Config(match only {
                Some(name) => format!("No output file named {} in createWordFiles", name),
                None => "No output files configured in createWordFiles".to_string(),
            }));
        }
        Ok(files)
    }

    /// Write every selected document to disk
    pub fn generate(&self, only: Option<&str>) -> Yaml2DocxResult<GenerationResult> {
        info!("Starting document export");
        let start_time = Instant::now();
        let mut visited = VisitedSets::default();
        let mut result = GenerationResult::default();

        for file in self.selected_files(only)? {
            let output = self.config.resolve_path(&file.file_name);
            let writer = utils::ensure_parent_dir(&output)
                .map_err(Yaml2DocxError::from)
                .and_then(|_| self.open_writer(file, &output));
            let file_result = match writer {
                Ok(mut writer) => self.generate_file(file, &mut writer, &mut visited),
                Err(e) => {
                    error!("Skipping {}: {}", output.display(), e);
                    FileResult::failed(output, e.to_string())
                }
            };
            result.files.push(file_result);
        }

        info!(
            "Export completed in {}: {} of {} documents written",
            utils::format_duration(start_time.elapsed()),
            result.succeeded(),
            result.files.len()
        );
        Ok(result)
    }

    /// Render every selected document into sinks built by `make_sink`,
    /// sharing the visited sets across documents like [`Self::generate`]
    pub fn generate_with<S, F>(&self, only: Option<&str>, mut make_sink: F) -> Yaml2DocxResult<Vec<(FileResult, S)>>
    where
        S: DocumentSink,
        F: FnMut(&CreateWordFile) -> S,
    {
        let mut visited = VisitedSets::default();
        let mut out = Vec::new();
        for file in self.selected_files(only)? {
            let mut sink = make_sink(file);
            let file_result = self.generate_file(file, &mut sink, &mut visited);
            out.push((file_result, sink));
        }
        Ok(out)
    }

    /// Render one document. Failures opening inputs or writing the
    /// document end this document only and are recorded in the result.
    pub fn generate_file(
        &self,
        file: &CreateWordFile,
        sink: &mut dyn DocumentSink,
        visited: &mut VisitedSets,
    ) -> FileResult {
        let output = self.config.resolve_path(&file.file_name);
        info!("Creating document {}", output.display());

        let mut state = DocumentState::new();
        let outcome = self.render_file(file, &output, sink, &mut state, visited);

        let error = match outcome {
            Ok(()) => {
                info!(
                    "Wrote {} with {} tables and {} warnings",
                    output.display(),
                    state.tables_written,
                    state.warnings.len()
                );
                None
            }
            Err(e) => {
                error!("Failed to create {}: {:#}", output.display(), e);
                Some(format!("{:#}", e))
            }
        };

        FileResult {
            output,
            tables_written: state.tables_written,
            warnings: state.warnings,
            error,
        }
    }

    fn open_writer(&self, file: &CreateWordFile, output: &Path) -> Yaml2DocxResult<DocxWriter> {
        let writer = match &file.use_template_fn {
            Some(template) => {
                let template = self.config.resolve_path(template);
                DocxWriter::from_template(output, &template)
                    .map_err(|e| Yaml2DocxError::Document(format!("{:#}", e)))?
            }
            None => DocxWriter::create(output),
        };

        if file.list_styles {
            for name in writer.style_names() {
                info!("  Style: {}", name);
            }
        }
        Ok(writer)
    }

    fn render_file(
        &self,
        file: &CreateWordFile,
        output: &Path,
        sink: &mut dyn DocumentSink,
        state: &mut DocumentState,
        visited: &mut VisitedSets,
    ) -> Result<()> {
        sink.begin_document()?;

        for source in file.all_sources() {
            let path = self.config.resolve_path(source.file_name());
            if source.skip() {
                info!("Skipping {} source {}", source.kind_name(), path.display());
                continue;
            }

            let mut ctx = RenderContext::new(&self.config, &mut *sink, &mut *state);
            match &source {
                InputSource::OpenApi(open_api) => {
                    let doc = OpenApiDocument::from_file(&path)
                        .map_err(|e| Yaml2DocxError::OpenApi(format!("{:#}", e)))?;
                    self.run_openapi_source(&mut ctx, open_api, &doc, visited)?;
                }
                InputSource::RailRoad(text_source) => {
                    let parts = TextParts::from_file(&path, PartSyntax::RailRoad)?;
                    self.run_text_source(&mut ctx, text_source, &parts, &path, output)?;
                }
                InputSource::Grammar(text_source) => {
                    let parts = TextParts::from_file(&path, PartSyntax::Grammar)?;
                    self.run_text_source(&mut ctx, text_source, &parts, &path, output)?;
                }
            }
        }

        sink.save_document()
    }

    fn run_openapi_source(
        &self,
        ctx: &mut RenderContext<'_>,
        source: &OpenApiSource,
        doc: &OpenApiDocument,
        visited: &mut VisitedSets,
    ) -> Result<()> {
        if source.list_operations {
            info!("Listing operation ids:");
            for line in lister::list_operation_ids(doc, "  ") {
                info!("{}", line);
            }
        }

        for action in &source.actions {
            debug!("Running action {}", action.action);
            match action.kind() {
                Some(ActionKind::Paragraph) => text::export_paragraph(ctx, action)?,
                Some(ActionKind::Tables) => {
                    for (op_id, op_config) in &source.use_operations {
                        if action.skip_if_visited && visited.operations.contains(op_id) {
                            debug!("Operation {} already documented", op_id);
                            continue;
                        }
                        let Some(op) = doc.find_operation(op_id) else {
                            ctx.report(format!("Operation {} not found, skipping", op_id));
                            continue;
                        };
                        let view = build_operation_view(doc, &op, op_config, &self.config);
                        operation::export_operation(ctx, &view, op_config, action)?;
                        visited.operations.insert(op_id.clone());
                    }
                }
                Some(ActionKind::Overview) => {
                    let mut entries = Vec::new();
                    for (op_id, op_config) in &source.use_operations {
                        let Some(op) = doc.find_operation(op_id) else {
                            ctx.report(format!("Operation {} not found, skipping", op_id));
                            continue;
                        };
                        let view = build_operation_view(doc, &op, op_config, &self.config);
                        entries.push(OverviewEntry {
                            operation_id: view.operation_id,
                            explanation: view.explanation,
                            http: format!("{} {}", op.method, op.path),
                        });
                    }
                    operation::export_overview(ctx, &entries, action)?;
                }
                Some(ActionKind::Yaml) => {
                    for op_id in source.use_operations.keys() {
                        let Some(op) = doc.find_operation(op_id) else {
                            ctx.report(format!("Operation {} not found, skipping", op_id));
                            continue;
                        };
                        http::export_yaml(ctx, doc, &op, action)?;
                    }
                }
                Some(ActionKind::Schemas) => {
                    for name in schema::schemas_to_export(ctx, doc, action) {
                        if action.skip_if_visited && visited.schemas.contains(&name) {
                            debug!("Schema {} already documented", name);
                            continue;
                        }
                        if schema::export_schema(ctx, doc, &name, action)? {
                            visited.schemas.insert(name);
                        }
                    }
                }
                Some(ActionKind::Patterns) => schema::export_patterns(ctx, action)?,
                Some(kind @ (ActionKind::RailRoad | ActionKind::Grammar)) => {
                    ctx.report(format!("Action {} ({:?}) needs a text source, skipping", action.action, kind));
                }
                None => ctx.report(format!("Unknown action {}, skipping", action.action)),
            }
        }
        Ok(())
    }

    fn run_text_source(
        &self,
        ctx: &mut RenderContext<'_>,
        source: &TextSource,
        parts: &TextParts,
        path: &Path,
        output: &Path,
    ) -> Result<()> {
        if source.list_names {
            info!("Parts of {}:", path.display());
            for name in parts.names() {
                info!("  - {}", name);
            }
        }

        for action in &source.actions {
            debug!("Running action {}", action.action);
            match action.kind() {
                Some(ActionKind::Paragraph) => text::export_paragraph(ctx, action)?,
                Some(kind @ (ActionKind::RailRoad | ActionKind::Grammar)) => {
                    let (lines, missing) = parts.select(&action.parts);
                    for name in missing {
                        ctx.report(format!("Part {} not found in {}", name, path.display()));
                    }
                    if kind == ActionKind::RailRoad {
                        text::export_railroad(ctx, &lines, action)?;
                    } else {
                        let work_dir = path.parent().unwrap_or_else(|| Path::new("."));
                        let svg_target = text::svg_path(output, path, ctx.state.next_diagram());
                        text::export_grammar(ctx, &lines, action, work_dir, &svg_target)?;
                    }
                }
                Some(kind) => {
                    ctx.report(format!("Action {} ({:?}) needs an OpenAPI source, skipping", action.action, kind));
                }
                None => ctx.report(format!("Unknown action {}, skipping", action.action)),
            }
        }
        Ok(())
    }
}

/// Outcome of one output document
#[derive(Debug, Clone)]
pub struct FileResult {
    pub output: PathBuf,
    pub tables_written: usize,

    /// Reported skips, in the order they occurred
    pub warnings: Vec<String>,

    /// Why the document could not be completed
    pub error: Option<String>,
}

impl FileResult {
    pub fn failed(output: PathBuf, error: String) -> Self {
        Self {
            output,
            tables_written: 0,
            warnings: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Overall export result
#[derive(Debug, Default)]
pub struct GenerationResult {
    pub files: Vec<FileResult>,
}

impl GenerationResult {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum()
    }

    pub fn tables_written(&self) -> usize {
        self.files.iter().map(|f| f.tables_written).sum()
    }
}

/// Error types for the application
#[derive(thiserror::Error, Debug)]
pub enum Yaml2DocxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OpenAPI document error: {0}")]
    OpenApi(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Result type for the main application
pub type Yaml2DocxResult<T> = Result<T, Yaml2DocxError>;
