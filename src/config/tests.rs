//! Configuration tests

use super::*;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SAMPLE: &str = r#"
tableHeadingPrefix: "IEC operation "
tableColumnWidthCm: [2, 7, 1, 4, 1]
overviewColumnWidthCm: [1, 2]
patternInlineLimit: 40
inputs:
  - "serverId|Server to contact|false|string|0..1"
suppressInputs: [serverId]
globalReplacements:
  - "typeschema|fullmatch|Reference|Ref"
  - "broken rule"
createWordFiles:
  - fn: out/api.docx
    useTemplateFn: template.docx
    listStyles: true
    sources:
      - type: open_api
        fn: api.yaml
        actions:
          - action: ExportTables
            skipIfVisited: true
        useOperations:
          GetAllShells:
            explanation: Lists shells
          PostSubmodelReference:
            suppressInputs: [aasId]
      - type: grammar
        fn: grammar.txt
        actions:
          - action: ExportGrammar
            outputFormat: svg
    readRailRoadFiles:
      - fn: rail.txt
        listNames: true
"#;

#[test]
fn test_config_serialization() {
    let config = ExportConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: ExportConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(config.body, parsed.body);
    assert_eq!(config.pattern_inline_limit, parsed.pattern_inline_limit);
    assert_eq!(parsed.number_empty_lines, 1);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config = ExportConfig::from_yaml_str("bodyStyle: Body Text\n", None).unwrap();
    assert_eq!(config.body_style, "Body Text");
    assert_eq!(config.table_cell_border_width, 8);
    assert!(config.add_table_captions);
    assert!(config.create_word_files.is_empty());
}

#[test]
fn test_sample_config() {
    let config = ExportConfig::from_yaml_str(SAMPLE, Some(PathBuf::from("/work"))).unwrap();

    assert_eq!(config.table_heading_prefix, "IEC operation ");
    assert_eq!(config.inputs.names(), vec!["serverId"]);
    assert_eq!(config.reps.len(), 1);

    let file = &config.create_word_files[0];
    assert_eq!(file.file_name, PathBuf::from("out/api.docx"));
    assert_eq!(file.use_template_fn, Some(PathBuf::from("template.docx")));

    let sources = file.all_sources();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0].kind_name(), "open_api");
    assert_eq!(sources[1].kind_name(), "grammar");
    assert_eq!(sources[2].kind_name(), "rail_road");

    match &sources[0] {
        InputSource::OpenApi(api) => {
            let ids: Vec<&str> = api.use_operations.keys().map(String::as_str).collect();
            assert_eq!(ids, vec!["GetAllShells", "PostSubmodelReference"]);
            assert_eq!(
                api.use_operations["PostSubmodelReference"].suppress_inputs,
                vec!["aasId".to_string()]
            );
            assert!(api.actions[0].skip_if_visited);
            assert_eq!(api.actions[0].kind(), Some(ActionKind::Tables));
        }
        other => panic!("unexpected source {:?}", other),
    }

    match &sources[1] {
        InputSource::Grammar(g) => assert_eq!(g.actions[0].output_format, OutputFormat::Svg),
        other => panic!("unexpected source {:?}", other),
    }
}

#[test]
fn test_diagram_and_border_settings() {
    let config = ExportConfig::default();
    assert_eq!(config.grammar_code_target_width_cm, 16.0);
    assert_eq!(config.grammar_code_max_height_cm, Some(22.0));
    assert_eq!(config.yaml_mono_border_width, 8);
    assert!(config.docker_svg2bitmap_args.contains("%in-fn%"));
    assert!(config.docker_svg2bitmap_args.contains("%out-fn%"));

    let yaml = r#"
dockerSvg2BitmapCmd: rsvg-convert
dockerSvgBitmapfArgs: '-o "%out-fn%" "%in-fn%"'
yamlMonoBorderWidth: 0
grammarCodeTargetWidthCm: 12.5
createWordFiles:
  - fn: out.docx
    sources:
      - type: grammar
        fn: grammar.txt
        actions:
          - action: ExportGrammar
            outputFormat: svg
            targetWidthCm: 10
            cropBottomCm: 0.5
"#;
    let config = ExportConfig::from_yaml_str(yaml, None).unwrap();
    assert_eq!(config.docker_svg2bitmap_cmd, "rsvg-convert");
    assert_eq!(config.docker_svg2bitmap_args, r#"-o "%out-fn%" "%in-fn%""#);
    assert_eq!(config.yaml_mono_border_width, 0);
    assert_eq!(config.grammar_code_target_width_cm, 12.5);
    match &config.create_word_files[0].all_sources()[0] {
        InputSource::Grammar(g) => {
            assert_eq!(g.actions[0].target_width_cm, Some(10.0));
            assert_eq!(g.actions[0].crop_bottom_cm, Some(0.5));
        }
        other => panic!("unexpected source {:?}", other),
    }

    assert!(ExportConfig::from_yaml_str("grammarCodeTargetWidthCm: 0\n", None).is_err());
}

#[test]
fn test_widths_in_twips() {
    let config = ExportConfig::from_yaml_str(SAMPLE, None).unwrap();
    assert_eq!(config.table_widths(), vec![1134, 3969, 567, 2268, 567]);
    // wrong column count falls back to defaults
    assert_eq!(config.overview_widths(), vec![2268, 4536, 2268]);
    assert_eq!(config.schema_widths().len(), 6);
}

#[test]
fn test_config_validation() {
    let mut config = ExportConfig::default();
    assert!(config.validate().is_ok());

    config.table_column_width_cm = Some(vec![1.0, 0.0, 1.0, 1.0, 1.0]);
    assert!(config.validate().is_err());

    config.table_column_width_cm = None;
    config.create_word_files.push(CreateWordFile::default());
    assert!(config.validate().is_err());
}

#[test]
fn test_config_from_file() {
    let mut config = ExportConfig::default();
    config.create_word_files.push(CreateWordFile {
        file_name: PathBuf::from("doc.docx"),
        read_open_api_files: vec![OpenApiSource {
            file_name: PathBuf::from("api.yaml"),
            ..Default::default()
        }],
        ..Default::default()
    });

    let temp_file = NamedTempFile::new().unwrap();
    config.save_to_file(temp_file.path()).unwrap();

    let loaded = ExportConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(loaded.create_word_files, config.create_word_files);
    assert_eq!(loaded.base_dir.as_deref(), temp_file.path().parent());
}

#[test]
fn test_resolve_path() {
    let mut config = ExportConfig::default();
    config.base_dir = Some(PathBuf::from("/cfg"));
    assert_eq!(config.resolve_path(Path::new("api.yaml")), PathBuf::from("/cfg/api.yaml"));
    assert_eq!(config.resolve_path(Path::new("/abs/api.yaml")), PathBuf::from("/abs/api.yaml"));
}
