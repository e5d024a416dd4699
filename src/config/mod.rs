//! Configuration management for Yaml2Docx

pub mod action;
pub mod config;
pub mod output;
pub mod parameters;
pub mod replacements;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use action::{ActionKind, ExportAction, OutputFormat};
pub use config::ExportConfig;
pub use output::{CreateWordFile, InputSource, OpenApiSource, TextSource};
pub use parameters::{OperationConfig, ParameterInfo, ParameterInfoList};
pub use replacements::{GlobalReplacements, ReplaceTarget};
