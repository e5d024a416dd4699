//! Derived view of one operation: merged inputs and outputs

use tracing::debug;

use super::document::{strip_response_head, strip_schema_head, OperationRef};
use super::types::{MediaType, OpenApiDocument, Parameter, Response};
use crate::config::{ExportConfig, OperationConfig, ParameterInfo, ParameterInfoList};

/// Type text used when a parameter has neither a type nor a reference
pub const TYPE_TBD: &str = "TBD";

/// Type text of a response without a schema reference
pub const NO_TYPE: &str = "\u{2014}";

pub const REQUEST_BODY_NAME: &str = "requestBody";
pub const RESPONSE_BODY_NAME: &str = "responseBody";

/// Inputs and outputs of an operation as listed in its interface table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationView {
    pub operation_id: String,

    /// Configured explanation, else the operation summary
    pub explanation: String,

    pub inputs: ParameterInfoList,
    pub outputs: ParameterInfoList,

    /// Row synthesized from the request body, also part of `inputs`
    pub request_row: Option<ParameterInfo>,

    /// Rows synthesized from success responses, in status code order
    pub response_rows: Vec<ParameterInfo>,
}

/// A response with its `$ref` followed
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResponse {
    pub response: Response,

    /// Bare component name of the reference, if any
    pub component_name: Option<String>,
}

impl ResolvedResponse {
    /// Description, falling back to the component name
    pub fn label(&self) -> Option<&str> {
        self.response
            .description
            .as_deref()
            .or(self.component_name.as_deref())
    }
}

/// Join a referenced component response onto a copy of the local one
pub fn resolve_response(doc: &OpenApiDocument, response: &Response) -> ResolvedResponse {
    let mut joined = response.clone();
    let mut component_name = None;

    if let Some(reference) = &response.reference {
        component_name = Some(strip_response_head(reference).to_string());
        match doc.find_response(reference) {
            Some(target) => joined.join(target),
            None => debug!("Response reference {} does not resolve", reference),
        }
    }

    ResolvedResponse {
        response: joined,
        component_name,
    }
}

/// Schema name of the first content entry carrying a reference
pub fn first_content_schema<'a, I>(content: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a String, &'a MediaType)>,
{
    content
        .into_iter()
        .find_map(|(_, media)| media.schema_ref())
        .map(strip_schema_head)
}

/// Convert a `query`, `path` or `header` parameter into an input row
pub fn parameter_to_info(parameter: &Parameter) -> Option<ParameterInfo> {
    let location = parameter.location.as_deref()?;
    if !matches!(location, "query" | "path" | "header") {
        return None;
    }
    let name = parameter.name.clone()?;

    let type_name = parameter
        .schema
        .as_ref()
        .and_then(|s| {
            s.type_name
                .clone()
                .or_else(|| s.reference.as_deref().map(|r| strip_schema_head(r).to_string()))
        })
        .unwrap_or_else(|| TYPE_TBD.to_string());

    Some(ParameterInfo::new(
        name,
        parameter.description.clone().unwrap_or_default(),
        parameter.required,
        type_name,
        if parameter.required { "1" } else { "0..1" },
    ))
}

/// Build the interface view of an operation.
///
/// Inputs: document-wide inputs, then the operation's configured inputs,
/// then the operation's parameters, then the request body row, each layer
/// replacing same-named entries in place. Outputs: document-wide outputs,
/// then configured outputs, then one `responseBody` row per success
/// response.
/// Finally the operation's suppression list, or the document-wide one if
/// the operation has none, removes entries by name.
pub fn build_operation_view(
    doc: &OpenApiDocument,
    op: &OperationRef<'_>,
    op_config: &OperationConfig,
    base: &ExportConfig,
) -> OperationView {
    let operation = op.operation;
    let mut inputs = base.inputs.clone();
    inputs.add_or_replace_all(&op_config.inputs);

    let path_params = doc
        .paths
        .get(op.path)
        .map(|item| item.parameters.as_slice())
        .unwrap_or_default();
    for parameter in path_params.iter().chain(operation.parameters.iter()) {
        let parameter = doc.deref_parameter(parameter);
        if let Some(info) = parameter_to_info(parameter) {
            inputs.add_or_replace(info);
        }
    }

    let request_row = operation.request_body.as_ref().map(|body| {
        let body = doc.deref_request_body(body);
        let type_name = first_content_schema(&body.content)
            .map(str::to_string)
            .or_else(|| {
                body.content
                    .values()
                    .find_map(|m| m.schema.as_ref().and_then(|s| s.type_name.clone()))
            })
            .unwrap_or_else(|| NO_TYPE.to_string());
        ParameterInfo::new(
            REQUEST_BODY_NAME,
            body.description.clone().unwrap_or_default(),
            body.required,
            type_name,
            if body.required { "1" } else { "0..1" },
        )
    });
    if let Some(row) = &request_row {
        inputs.add_or_replace(row.clone());
    }

    let mut outputs = base.outputs.clone();
    outputs.add_or_replace_all(&op_config.outputs);
    let mut response_rows = Vec::new();
    for (code, response) in &operation.responses {
        if !code.starts_with('2') {
            continue;
        }
        let resolved = resolve_response(doc, response);
        let type_name = first_content_schema(&resolved.response.content)
            .unwrap_or(NO_TYPE)
            .to_string();
        let row = ParameterInfo::new(
            RESPONSE_BODY_NAME,
            resolved.label().unwrap_or_default(),
            true,
            type_name,
            "1",
        );
        outputs.add_or_replace(row.clone());
        response_rows.push(row);
    }

    let suppress_inputs = if op_config.suppress_inputs.is_empty() {
        &base.suppress_inputs
    } else {
        &op_config.suppress_inputs
    };
    for name in suppress_inputs {
        inputs.remove_by_name(name);
    }

    let suppress_outputs = if op_config.suppress_outputs.is_empty() {
        &base.suppress_outputs
    } else {
        &op_config.suppress_outputs
    };
    for name in suppress_outputs {
        outputs.remove_by_name(name);
    }

    OperationView {
        operation_id: op.id().to_string(),
        explanation: op_config
            .explanation
            .clone()
            .or_else(|| operation.summary.clone())
            .unwrap_or_default(),
        inputs,
        outputs,
        request_row,
        response_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r##"
openapi: 3.0.3
paths:
  /shells/{aasId}/submodel-refs:
    parameters:
      - name: traceId
        in: header
        schema: { type: string }
    post:
      operationId: PostSubmodelReference
      summary: Creates a submodel reference at the shell
      parameters:
        - name: aasId
          in: path
          required: true
          description: The shell identifier
          schema: { type: string }
        - name: session
          in: cookie
          schema: { type: string }
        - $ref: '#/components/parameters/Limit'
        - name: cursor
          in: query
      requestBody:
        description: Reference to the submodel
        required: true
        content:
          text/plain:
            schema: { type: string }
          application/json:
            schema:
              $ref: '#/components/schemas/Reference'
      responses:
        '201':
          description: Submodel reference created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Result'
        '400':
          $ref: '#/components/responses/BadRequest'
    get:
      operationId: GetAllSubmodelReferences
      responses:
        '200':
          $ref: '#/components/responses/ReferenceList'
        '204':
          description: Nothing here
components:
  schemas:
    Result: { type: object }
    Reference: { type: object }
  parameters:
    Limit:
      name: limit
      in: query
      schema:
        $ref: '#/components/schemas/PositiveInt'
  responses:
    BadRequest:
      description: Bad request
    ReferenceList:
      description: Requested references
      content:
        application/json:
          schema:
            type: array
            items:
              $ref: '#/components/schemas/Reference'
"##;

    fn view(id: &str, op_config: &OperationConfig, base: &ExportConfig) -> OperationView {
        let doc = OpenApiDocument::from_yaml_str(DOC).unwrap();
        let op = doc.find_operation(id).unwrap();
        build_operation_view(&doc, &op, op_config, base)
    }

    #[test]
    fn test_post_submodel_reference_rows() {
        let v = view(
            "PostSubmodelReference",
            &OperationConfig::default(),
            &ExportConfig::default(),
        );

        assert_eq!(v.explanation, "Creates a submodel reference at the shell");
        assert_eq!(
            v.inputs.names(),
            vec!["traceId", "aasId", "limit", "cursor", "requestBody"]
        );

        let aas_id = v.inputs.get("aasId").unwrap();
        assert_eq!(
            aas_id,
            &ParameterInfo::new("aasId", "The shell identifier", true, "string", "1")
        );
        assert_eq!(v.inputs.get("limit").unwrap().type_name, "PositiveInt");
        assert_eq!(v.inputs.get("cursor").unwrap().type_name, TYPE_TBD);
        assert_eq!(v.inputs.get("cursor").unwrap().card, "0..1");

        let body = v.request_row.as_ref().unwrap();
        assert_eq!(body.type_name, "Reference");
        assert!(body.mandatory);

        assert_eq!(v.response_rows.len(), 1);
        assert_eq!(
            v.outputs.get("responseBody").unwrap(),
            &ParameterInfo::new("responseBody", "Submodel reference created", true, "Result", "1")
        );
    }

    #[test]
    fn test_response_reference_is_joined() {
        let v = view(
            "GetAllSubmodelReferences",
            &OperationConfig::default(),
            &ExportConfig::default(),
        );
        assert_eq!(v.response_rows.len(), 2);
        assert_eq!(v.response_rows[0].type_name, "Reference");
        assert_eq!(v.response_rows[0].description, "Requested references");
        assert_eq!(v.response_rows[1].type_name, NO_TYPE);
        // the later success response replaces the earlier row
        assert_eq!(v.outputs.len(), 1);
        assert_eq!(v.outputs.get("responseBody").unwrap().description, "Nothing here");
    }

    #[test]
    fn test_synthesized_rows_layer_over_operation_config() {
        let base = ExportConfig {
            inputs: ParameterInfoList::from(vec![ParameterInfo::parse("serverId|Server|false|string|0..1")]),
            ..Default::default()
        };
        let op_config = OperationConfig {
            explanation: Some("Configured".to_string()),
            inputs: ParameterInfoList::from(vec![ParameterInfo::parse(
                "aasId|AAS identifier|false|AssetAdministrationShellId|0..1",
            )]),
            outputs: ParameterInfoList::from(vec![ParameterInfo::parse(
                "responseBody|Configured result|false|Unknown|0..1",
            )]),
            ..Default::default()
        };

        let v = view("PostSubmodelReference", &op_config, &base);
        assert_eq!(v.explanation, "Configured");
        assert_eq!(
            v.inputs.names(),
            vec!["serverId", "aasId", "traceId", "limit", "cursor", "requestBody"]
        );
        assert_eq!(
            v.inputs.get("aasId").unwrap(),
            &ParameterInfo::new("aasId", "The shell identifier", true, "string", "1")
        );
        assert_eq!(
            v.outputs.get("responseBody").unwrap(),
            &ParameterInfo::new("responseBody", "Submodel reference created", true, "Result", "1")
        );
    }

    #[test]
    fn test_parameter_keeps_configured_position() {
        let doc = OpenApiDocument::from_yaml_str(
            r#"
paths:
  /shells/{aasId}:
    get:
      operationId: GetShell
      parameters:
        - name: aasId
          in: path
          required: true
          schema: { type: string }
"#,
        )
        .unwrap();
        let op = doc.find_operation("GetShell").unwrap();
        let op_config = OperationConfig {
            inputs: ParameterInfoList::from(vec![
                ParameterInfo::parse("first|First input|false|string|0..1"),
                ParameterInfo::parse("aasId|Configured|false|CfgType|0..1"),
            ]),
            ..Default::default()
        };

        let v = build_operation_view(&doc, &op, &op_config, &ExportConfig::default());
        assert_eq!(v.inputs.names(), vec!["first", "aasId"]);
        let aas_id = v.inputs.get("aasId").unwrap();
        assert_eq!(aas_id.type_name, "string");
        assert!(aas_id.mandatory);
        assert_eq!(aas_id.card, "1");
    }

    #[test]
    fn test_suppression_is_exclusive() {
        let base = ExportConfig {
            suppress_inputs: vec!["cursor".to_string()],
            ..Default::default()
        };
        let op_config = OperationConfig {
            suppress_inputs: vec!["aasId".to_string(), "absent".to_string()],
            ..Default::default()
        };

        let v = view("PostSubmodelReference", &op_config, &base);
        assert!(v.inputs.get("aasId").is_none());
        assert!(v.inputs.get("cursor").is_some());

        let v = view("PostSubmodelReference", &OperationConfig::default(), &base);
        assert!(v.inputs.get("aasId").is_some());
        assert!(v.inputs.get("cursor").is_none());
    }

    #[test]
    fn test_resolved_response_label() {
        let doc = OpenApiDocument::from_yaml_str(DOC).unwrap();
        let unresolved = Response {
            reference: Some("#/components/responses/Unknown".to_string()),
            ..Default::default()
        };
        let resolved = resolve_response(&doc, &unresolved);
        assert_eq!(resolved.label(), Some("Unknown"));

        let bad = Response {
            reference: Some("#/components/responses/BadRequest".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_response(&doc, &bad).label(), Some("Bad request"));
    }
}
