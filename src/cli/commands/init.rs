//! Init command implementation

use crate::config::{
    CreateWordFile, ExportAction, InputSource, OpenApiSource, OperationConfig, ParameterInfo,
};
use crate::utils::ensure_parent_dir;
use crate::ExportConfig;
use anyhow::Result;
use clap::{ArgMatches, Command};
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("init")
        .about("Initialize a new configuration file")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file path")
                .value_name("FILE")
                .default_value("yaml2docx.yaml"),
        )
        .arg(
            clap::Arg::new("example")
                .short('e')
                .long("example")
                .help("Create example configuration")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let output_path = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("yaml2docx.yaml"));
    let example = matches.get_flag("example");

    info!("Initializing configuration file: {:?}", output_path);

    let config = if example {
        create_example_config()
    } else {
        ExportConfig::default()
    };

    ensure_parent_dir(&output_path)?;
    config.save_to_file(&output_path)?;

    info!("Configuration file created: {:?}", output_path);

    if example {
        println!("Example configuration created with a sample OpenAPI source.");
        println!("Edit the file to point at your API description and operations.");
    } else {
        println!("Configuration file with default settings created.");
        println!("Add createWordFiles entries to get started.");
    }

    Ok(())
}

/// Configuration documenting two operations and the schemas they use
pub fn create_example_config() -> ExportConfig {
    let mut use_operations = IndexMap::new();
    use_operations.insert("GetAllShells".to_string(), OperationConfig::default());
    use_operations.insert(
        "PostShell".to_string(),
        OperationConfig {
            notes: vec!["Note: the shell identifier is assigned by the server.".to_string()],
            ..Default::default()
        },
    );

    let mut intro = ExportAction::new("ExportParagraph");
    intro.para_text = Some("Interface operations".to_string());
    intro.para_style = Some("Heading 2".to_string());

    let mut schemas = ExportAction::new("ExportSchemas");
    schemas.include_schemas = vec!["Shell".to_string()];
    schemas.skip_if_visited = true;

    let mut yaml = ExportAction::new("ExportYaml");
    yaml.yaml_as_table = true;

    let source = OpenApiSource {
        file_name: PathBuf::from("openapi.yaml"),
        actions: vec![
            intro,
            ExportAction::new("ExportOverview"),
            ExportAction::new("ExportTables"),
            yaml,
            schemas,
            ExportAction::new("ExportPatterns"),
        ],
        use_operations,
        ..Default::default()
    };

    ExportConfig {
        outputs: vec![ParameterInfo::new("statusCode", "HTTP status code", true, "integer", "1")].into(),
        suppress_inputs: vec!["cursor".to_string()],
        global_replacements: vec!["typeSchema|fullMatch|string|String".to_string()],
        create_word_files: vec![CreateWordFile {
            file_name: PathBuf::from("api.docx"),
            sources: vec![InputSource::OpenApi(source)],
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("yaml2docx.yaml");
        create_example_config().save_to_file(&path).unwrap();

        let loaded = ExportConfig::from_file(&path).unwrap();
        assert_eq!(loaded.create_word_files.len(), 1);
        assert_eq!(loaded.reps.len(), 1);
        let sources = loaded.create_word_files[0].all_sources();
        assert_eq!(sources[0].actions().len(), 6);
    }
}
