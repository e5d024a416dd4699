//! HTTP description of an operation: response table and YAML source

use anyhow::Result;
use indexmap::IndexMap;
use yaml2docx_docx::{Cell, Paragraph, Row, Table};

use super::{RenderContext, Substitution};
use crate::config::{ExportAction, ReplaceTarget};
use crate::openapi::operation::NO_TYPE;
use crate::openapi::{resolve_response, strip_schema_head, OpenApiDocument, OperationRef, ResolvedResponse};

/// Responses with their references followed, in declaration order
fn resolved_responses<'d>(
    ctx: &mut RenderContext<'_>,
    doc: &'d OpenApiDocument,
    op: &OperationRef<'d>,
) -> Vec<(&'d str, ResolvedResponse)> {
    let mut resolved = Vec::new();
    for (code, response) in &op.operation.responses {
        let unresolved = response
            .reference
            .as_deref()
            .is_some_and(|r| doc.find_response(r).is_none());
        let joined = resolve_response(doc, response);
        if joined.response.description.is_none() && unresolved {
            ctx.report(format!(
                "Operation {}: response {} references unknown component {}",
                op.id(),
                code,
                response.reference.as_deref().unwrap_or_default()
            ));
            continue;
        }
        resolved.push((code.as_str(), joined));
    }
    resolved
}

/// `Schema (content-type)` per content entry, one per line
fn payload_text(ctx: &mut RenderContext<'_>, op_id: &str, code: &str, response: &ResolvedResponse) -> String {
    let mut lines = Vec::new();
    for (content_type, media) in &response.response.content {
        match media.schema_ref() {
            Some(reference) => lines.push(format!(
                "{} ({})",
                ctx.replace(ReplaceTarget::TypeSchema, strip_schema_head(reference)),
                content_type
            )),
            None => ctx.report(format!(
                "Operation {}: response {} content {} has no schema reference",
                op_id, code, content_type
            )),
        }
    }
    if lines.is_empty() {
        NO_TYPE.to_string()
    } else {
        lines.join("\n")
    }
}

/// Three-column response table, or five columns when any response has headers
pub fn http_table(ctx: &mut RenderContext<'_>, doc: &OpenApiDocument, op: &OperationRef<'_>) -> Table {
    let responses = resolved_responses(ctx, doc, op);
    let with_headers = responses
        .iter()
        .any(|(_, r)| !r.response.headers.is_empty());

    let config = ctx.config;
    let (widths, columns) = if with_headers {
        (config.five_column_widths(), 5)
    } else {
        (config.three_column_widths(), 3)
    };
    let mut table = Table::new(widths, config.table_cell_border_width);

    let mut first = vec![
        Cell::new("Operation"),
        Cell::new(format!("{} {}", op.method, op.path)).bold().span_start(),
    ];
    for _ in 2..columns {
        first.push(Cell::span_continue());
    }
    table.push(Row::new(first));

    let mut header = vec!["HTTP code", "Description", "Payload"];
    if with_headers {
        header.extend(["Header", "Header description"]);
    }
    table.push(Row::new(header.into_iter().map(|t| Cell::new(t).bold()).collect()).header());

    for (code, response) in &responses {
        let description = ctx.replace(ReplaceTarget::Description, response.label().unwrap_or_default());
        let payload = payload_text(ctx, op.id(), code, response);

        if !with_headers {
            table.push(
                Row::new(vec![Cell::new(*code), Cell::new(description), Cell::new(payload)]).cant_split(),
            );
            continue;
        }

        let headers = &response.response.headers;
        if headers.is_empty() {
            table.push(
                Row::new(vec![
                    Cell::new(*code),
                    Cell::new(description),
                    Cell::new(payload),
                    Cell::empty(),
                    Cell::empty(),
                ])
                .cant_split(),
            );
            continue;
        }

        let merged = headers.len() > 1;
        for (index, (name, header)) in headers.iter().enumerate() {
            let header_description =
                ctx.replace(ReplaceTarget::Description, header.description.as_deref().unwrap_or_default());
            let mut cells = if index == 0 {
                let lead = [Cell::new(*code), Cell::new(description.as_str()), Cell::new(payload.as_str())];
                if merged {
                    lead.into_iter().map(Cell::rows_start).collect()
                } else {
                    lead.to_vec()
                }
            } else {
                vec![Cell::rows_continue(), Cell::rows_continue(), Cell::rows_continue()]
            };
            cells.push(Cell::new(name.as_str()));
            cells.push(Cell::new(header_description));
            table.push(Row::new(cells));
        }
    }

    table
}

/// The operation re-serialised under its path and verb, without semantic ids
pub fn yaml_source(op: &OperationRef<'_>) -> Result<String> {
    let mut operation = op.operation.clone();
    operation.semantic_ids = None;

    let mut verbs = IndexMap::new();
    verbs.insert(op.method.key(), operation);
    let mut paths = IndexMap::new();
    paths.insert(op.path, verbs);

    Ok(serde_yaml::to_string(&paths)?)
}

/// Heading, optional YAML source, optional response table with caption
pub fn export_yaml(
    ctx: &mut RenderContext<'_>,
    doc: &OpenApiDocument,
    op: &OperationRef<'_>,
    action: &ExportAction,
) -> Result<()> {
    let config = ctx.config;
    let op_id = op.id();
    ctx.heading(&format!("{}{}", config.yaml_heading_prefix, op_id), &config.yaml_heading_style)?;

    if action.yaml_as_source {
        for line in yaml_source(op)?.lines() {
            let paragraph = Paragraph::code(Some(config.yaml_code_style.as_str()), line, config.yaml_code_font_size)
                .bordered(config.yaml_mono_border_width);
            ctx.sink.add_paragraph(&paragraph)?;
        }
    }

    if action.yaml_as_table {
        let table_ref = ctx.state.reserve_table();
        if let Some(body) = &action.body {
            let substitutions = [
                ("%opid%", Substitution::Text(op_id.to_string())),
                ("%table%", ctx.table_substitution(&table_ref)),
            ];
            ctx.body(body, &substitutions)?;
        }
        let table = http_table(ctx, doc, op);
        let caption = format!("{}{}", config.yaml_table_caption_prefix, op_id);
        ctx.table_with_caption(&table, &table_ref, &caption)?;
    }

    ctx.notes(&action.notes)?;
    ctx.empty_lines()
}
