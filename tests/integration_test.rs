use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;
use yaml2docx::{ExportConfig, Yaml2Docx};
use yaml2docx_docx::{MemorySink, Table};

const OPENAPI: &str = r##"
openapi: 3.0.3
info:
  title: Asset Administration Shell API
  version: "3.0"
paths:
  /shells/{aasId}/submodel-refs:
    post:
      operationId: PostSubmodelReference
      summary: Creates a submodel reference at the shell
      parameters:
        - name: aasId
          in: path
          required: true
          description: The shell identifier
          schema:
            type: string
      requestBody:
        description: Reference to the submodel
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Reference'
      responses:
        '201':
          description: Submodel reference created
          headers:
            Location:
              description: URL of the new reference
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Reference'
        '400':
          $ref: '#/components/responses/BadRequest'
  /shells:
    get:
      operationId: GetAllShells
      summary: Returns all shells
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
      responses:
        '200':
          description: Requested shells
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ShellList'
components:
  schemas:
    Key:
      type: object
      required: [type, value]
      properties:
        type:
          type: string
          enum: [Submodel, AssetAdministrationShell]
        value:
          type: string
          pattern: '^([\x09\x0a\x0d\x20-\ud7ff\ue000-\ufffd]|\ud800[\udc00-\udfff]|[\ud801-\udbfe][\udc00-\udfff])*$'
    Reference:
      type: object
      required: [keys]
      properties:
        keys:
          type: array
          minItems: 1
          items:
            $ref: '#/components/schemas/Key'
    Identifiable:
      type: object
      required: [id]
      properties:
        id:
          type: string
          pattern: '^([\x09\x0a\x0d\x20-\ud7ff\ue000-\ufffd]|\ud800[\udc00-\udfff]|[\ud801-\udbfe][\udc00-\udfff])*$'
    Shell:
      allOf:
        - $ref: '#/components/schemas/Identifiable'
        - properties:
            submodels:
              type: array
              items:
                $ref: '#/components/schemas/Reference'
    ShellList:
      type: array
      items:
        $ref: '#/components/schemas/Shell'
  responses:
    BadRequest:
      description: Bad request
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Result'
"##;

const CONFIG: &str = r#"
createWordFiles:
  - fn: out/api.docx
    sources:
      - type: open_api
        fn: openapi.yaml
        actions:
          - action: ExportPara
            paraText: Interface operations
            paraStyle: Heading 2
          - action: ExportTables
          - action: bogus
          - action: ExportOverview
          - action: ExportYaml
            yamlAsTable: true
          - action: ExportTables
            skipIfVisited: true
          - action: ExportSchemas
            includeSchemas: [Shell]
          - action: ExportPatterns
        useOperations:
          PostSubmodelReference: {}
          GetAllShells:
            explanation: Lists all shells
          MissingOperation: {}
"#;

const RAILROAD: &str = "\
idShort:
  |--[ letter ]--+--------------+--|
                 `-[ digit ]----'
version:
  |--[ digit ]--|
";

const TWO_FILES: &str = r#"
createWordFiles:
  - fn: broken.docx
    sources:
      - type: open_api
        fn: does-not-exist.yaml
        actions:
          - action: ExportTables
  - fn: rail.docx
    sources:
      - type: rail_road
        fn: rail.txt
        actions:
          - action: ExportRailRoad
            heading: Identifier syntax
            parts: [idShort, unknownPart]
"#;

fn setup(config: &str) -> (TempDir, Yaml2Docx) {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    std::fs::write(dir.join("openapi.yaml"), OPENAPI).unwrap();
    std::fs::write(dir.join("rail.txt"), RAILROAD).unwrap();
    let config_path = dir.join("yaml2docx.yaml");
    std::fs::write(&config_path, config).unwrap();

    let config = ExportConfig::from_file(&config_path).unwrap();
    (temp_dir, Yaml2Docx::new(config))
}

fn table_after_heading<'a>(sink: &'a MemorySink, first_cell: &str, value: &str) -> &'a Table {
    sink.tables()
        .into_iter()
        .find(|t| t.cell_text(0, 0) == Some(first_cell) && t.cell_text(0, 1) == Some(value))
        .unwrap()
}

#[test]
fn test_full_export_into_memory() {
    let (_temp_dir, app) = setup(CONFIG);
    let results = app.generate_with(None, |_| MemorySink::new()).unwrap();
    assert_eq!(results.len(), 1);
    let (result, sink) = &results[0];

    assert!(result.is_success(), "{:?}", result.error);
    assert!(sink.is_saved());

    // second ExportTables skips the operations documented by the first
    assert_eq!(
        sink.headings(),
        vec![
            "Interface operation PostSubmodelReference",
            "Interface operation GetAllShells",
            "HTTP operation PostSubmodelReference",
            "HTTP operation GetAllShells",
            "Schema Shell",
            "Schema Identifiable",
            "Schema Reference",
            "Schema Key",
        ]
    );
    assert_eq!(result.tables_written, 10);
    assert_eq!(sink.tables().len(), 10);

    let interface = table_after_heading(sink, "Interface Operation Name", "PostSubmodelReference");
    assert_eq!(
        interface.find_row("aasId").unwrap().texts(),
        vec!["aasId", "The shell identifier", "yes", "string", "1"]
    );
    assert_eq!(
        interface.find_row("requestBody").unwrap().texts(),
        vec!["requestBody", "Reference to the submodel", "yes", "Reference", "1"]
    );
    assert_eq!(
        interface.find_row("responseBody").unwrap().texts(),
        vec!["responseBody", "Submodel reference created", "yes", "Reference", "1"]
    );

    let shells = table_after_heading(sink, "Interface Operation Name", "GetAllShells");
    assert_eq!(shells.cell_text(1, 1), Some("Lists all shells"));

    let http = table_after_heading(sink, "Operation", "POST /shells/{aasId}/submodel-refs");
    assert_eq!(http.columns(), 5);
    assert_eq!(http.find_row("201").unwrap().cells[3].text, "Location");

    // both long patterns end up as one pattern table entry
    let patterns = sink.tables().into_iter().last().unwrap();
    assert_eq!(patterns.rows.len(), 2);
    assert_eq!(patterns.rows[1].cells[0].text, "1");

    let bogus: Vec<&String> = result.warnings.iter().filter(|w| w.contains("bogus")).collect();
    assert_eq!(bogus.len(), 1);
    let missing = result
        .warnings
        .iter()
        .filter(|w| w.contains("MissingOperation"))
        .count();
    assert_eq!(missing, 4);
}

#[test]
fn test_captions_are_numbered_in_order() {
    let (_temp_dir, app) = setup(CONFIG);
    let results = app.generate_with(None, |_| MemorySink::new()).unwrap();
    let (_, sink) = &results[0];

    let numbers: Vec<u32> = sink.captions().iter().map(|c| c.number).collect();
    assert_eq!(numbers, (1..=10).collect::<Vec<u32>>());
    assert_eq!(sink.captions()[0].bookmark, "Yaml2DocxTable1");
}

#[test]
fn test_failed_document_does_not_stop_the_run() {
    let (_temp_dir, app) = setup(TWO_FILES);
    let results = app.generate_with(None, |_| MemorySink::new()).unwrap();
    assert_eq!(results.len(), 2);

    let (broken, broken_sink) = &results[0];
    assert!(broken.error.is_some());
    assert!(!broken_sink.is_saved());

    let (rail, rail_sink) = &results[1];
    assert!(rail.is_success());
    assert_eq!(rail_sink.headings(), vec!["Identifier syntax"]);
    let code: Vec<String> = rail_sink
        .paragraphs()
        .iter()
        .filter(|p| p.monospace)
        .map(|p| p.plain_text())
        .collect();
    assert_eq!(code.len(), 2);
    assert!(code[0].contains("letter"));
    assert_eq!(rail.warnings.len(), 1);
    assert!(rail.warnings[0].contains("unknownPart"));
}

#[test]
fn test_only_selects_output_file() {
    let (_temp_dir, app) = setup(TWO_FILES);
    let results = app.generate_with(Some("rail.docx"), |_| MemorySink::new()).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].0.output.ends_with("rail.docx"));

    assert!(app.generate_with(Some("nope.docx"), |_| MemorySink::new()).is_err());
}

#[test]
fn test_generate_writes_docx_package() {
    let (temp_dir, app) = setup(CONFIG);
    let result = app.generate(None).unwrap();
    assert_eq!(result.succeeded(), 1);
    assert_eq!(result.tables_written(), 10);

    let output = temp_dir.path().join("out").join("api.docx");
    assert!(output.exists());
    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_missing_template_fails_only_that_file() {
    let config = r#"
createWordFiles:
  - fn: templated.docx
    useTemplateFn: missing-template.docx
    sources: []
  - fn: plain.docx
"#;
    let (temp_dir, app) = setup(config);
    let result = app.generate(None).unwrap();
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.failed(), 1);
    assert!(Path::new(&temp_dir.path().join("plain.docx")).exists());
}
