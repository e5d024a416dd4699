//! Plain-text listings of paths and operations

use super::types::OpenApiDocument;

/// `Path: /x [GET] [POST]` per path
pub fn list_paths(doc: &OpenApiDocument, prefix: &str) -> Vec<String> {
    doc.paths
        .iter()
        .map(|(path, item)| {
            let verbs: String = item
                .operations()
                .map(|(method, _)| format!(" [{}]", method))
                .collect();
            format!("{}Path: {}{}", prefix, path, verbs)
        })
        .collect()
}

/// `- OperationId` per operation
pub fn list_operation_ids(doc: &OpenApiDocument, prefix: &str) -> Vec<String> {
    doc.operations()
        .map(|op| format!("{}- {}", prefix, op.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listings() {
        let doc = OpenApiDocument::from_yaml_str(
            r#"
paths:
  /shells:
    get: { operationId: GetAllShells }
    post: { operationId: PostShell }
  /description:
    get: { operationId: GetDescription }
"#,
        )
        .unwrap();

        assert_eq!(
            list_paths(&doc, ""),
            vec!["Path: /shells [GET] [POST]", "Path: /description [GET]"]
        );
        assert_eq!(
            list_operation_ids(&doc, "  "),
            vec!["  - GetAllShells", "  - PostShell", "  - GetDescription"]
        );
    }
}
