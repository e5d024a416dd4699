//! Schema bundle tables and the pattern table

use anyhow::Result;
use tracing::debug;
use yaml2docx_docx::{Cell, Row, Table};

use super::patterns::{pattern_table, reference_text, PatternRegistry};
use super::{RenderContext, Substitution};
use crate::config::{ExportAction, ReplaceTarget};
use crate::openapi::{is_contained, OpenApiDocument, OriginatedPropertyList, Property, SchemaResolver};

/// Constraint texts of a member: enumeration, pattern, length, format.
///
/// Patterns longer than `inline_limit` characters are registered and
/// replaced by a reference to the pattern table.
pub fn constraint_lines(property: &Property, registry: &mut PatternRegistry, inline_limit: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(values) = property.enum_values.as_ref().filter(|v| !v.is_empty()) {
        lines.push(format!("Enumeration: {}", values.join(", ")));
    }

    if let Some(pattern) = property.pattern.as_deref() {
        if pattern.chars().count() > inline_limit {
            lines.push(reference_text(registry.register(pattern)));
        } else {
            lines.push(format!("Pattern: {}", pattern));
        }
    }

    if property.min_length.is_some() || property.max_length.is_some() {
        let min = property.min_length.unwrap_or(0);
        let max = property
            .max_length
            .map(|m| m.to_string())
            .unwrap_or_else(|| "*".to_string());
        lines.push(format!("Length: {}..{}", min, max));
    }

    if let Some(format) = &property.format {
        lines.push(format!("Format: {}", format));
    }

    lines
}

fn header_rows() -> [Row; 2] {
    let first = Row::new(vec![
        Cell::new("Member").bold().rows_start(),
        Cell::new("Description").bold().rows_start(),
        Cell::new("Type").bold().rows_start(),
        Cell::new("Occurrence").bold().span_start(),
        Cell::span_continue(),
        Cell::new("Origin").bold().rows_start(),
    ])
    .header();
    let second = Row::new(vec![
        Cell::rows_continue(),
        Cell::rows_continue(),
        Cell::rows_continue(),
        Cell::new("Req.").bold(),
        Cell::new("Card.").bold(),
        Cell::rows_continue(),
    ])
    .header();
    [first, second]
}

/// Six-column table of a resolved member bundle
pub fn schema_table(ctx: &mut RenderContext<'_>, properties: &OriginatedPropertyList, one_of_required: &[String]) -> Table {
    let config = ctx.config;
    let mut table = Table::new(config.schema_widths(), config.table_cell_border_width);
    for row in header_rows() {
        table.push(row);
    }

    let mut previous_origin: Option<&str> = None;
    for item in properties {
        let same_origin = previous_origin == Some(item.origin.as_str());
        let origin_cell = if same_origin {
            Cell::rows_continue()
        } else {
            Cell::new(ctx.replace(ReplaceTarget::ColumnFrom, &item.origin)).rows_start()
        };

        let required = if is_contained(one_of_required, &item.name) {
            "one of"
        } else if item.required {
            "yes"
        } else {
            "no"
        };

        let mut row = Row::new(vec![
            Cell::new(&item.name),
            Cell::new(ctx.replace(
                ReplaceTarget::Description,
                item.property.description.as_deref().unwrap_or_default(),
            )),
            Cell::new(ctx.replace(ReplaceTarget::TypeSchema, &item.type_text())),
            Cell::new(required),
            Cell::new(item.cardinality()),
            origin_cell,
        ]);
        if same_origin {
            row = row.cant_split();
        }
        table.push(row);

        let constraints = constraint_lines(&item.property, &mut ctx.state.patterns, config.pattern_inline_limit);
        if !constraints.is_empty() {
            table.push(
                Row::new(vec![
                    Cell::empty(),
                    Cell::new(constraints.join("\n")).span_start(),
                    Cell::span_continue(),
                    Cell::span_continue(),
                    Cell::span_continue(),
                    Cell::rows_continue(),
                ])
                .cant_split(),
            );
        }

        previous_origin = Some(item.origin.as_str());
    }

    table
}

/// Schemas an ExportSchemas action documents, in discovery order
pub fn schemas_to_export(ctx: &RenderContext<'_>, doc: &OpenApiDocument, action: &ExportAction) -> Vec<String> {
    let resolver = SchemaResolver::new(doc);
    resolver
        .discover_schemas(&action.include_schemas, &action.schema_not_follow)
        .into_iter()
        .filter(|name| {
            !is_contained(&action.suppress_schemas, name)
                && !is_contained(&ctx.config.suppress_schema_names, name)
        })
        .collect()
}

/// Heading, body, table, caption and notes of one schema.
/// Returns `false` when the schema could not be resolved.
pub fn export_schema(
    ctx: &mut RenderContext<'_>,
    doc: &OpenApiDocument,
    name: &str,
    action: &ExportAction,
) -> Result<bool> {
    let config = ctx.config;
    let resolver = SchemaResolver::new(doc);
    let mut properties = match resolver.resolve_properties(name, None, &action.schema_not_follow) {
        Ok(properties) => properties,
        Err(e) => {
            ctx.report(format!("Schema {}: {}", name, e));
            return Ok(false);
        }
    };
    properties.dedup_by_name();
    properties.remove_names(&action.suppress_members);
    properties.sort_by_origin(&config.origin_schema_order, name);
    let one_of_required = resolver.one_of_required(name);

    ctx.heading(&format!("{}{}", config.schema_heading_prefix, name), &config.schema_heading_style)?;

    let table_ref = ctx.state.reserve_table();
    let body = action.body.as_deref().unwrap_or(&config.schema_body);
    let substitutions = [
        ("%schema%", Substitution::Text(name.to_string())),
        ("%table%", ctx.table_substitution(&table_ref)),
    ];
    ctx.body(body, &substitutions)?;

    let table = schema_table(ctx, &properties, &one_of_required);
    let caption = format!("{}{}", config.schema_table_caption_prefix, name);
    ctx.table_with_caption(&table, &table_ref, &caption)?;

    ctx.notes(&action.notes)?;
    ctx.empty_lines()?;
    Ok(true)
}

/// Table of all registered patterns; the registry is cleared afterwards
pub fn export_patterns(ctx: &mut RenderContext<'_>, action: &ExportAction) -> Result<()> {
    if ctx.state.patterns.is_empty() {
        debug!("No patterns registered, skipping pattern table");
        return Ok(());
    }

    let config = ctx.config;
    if let Some(heading) = &action.heading {
        ctx.heading(heading, &config.heading2_style)?;
    }

    let table_ref = ctx.state.reserve_table();
    if let Some(body) = &action.body {
        let substitutions = [("%table%", ctx.table_substitution(&table_ref))];
        ctx.body(body, &substitutions)?;
    }

    let table = pattern_table(&ctx.state.patterns, config.pattern_widths(), config.table_cell_border_width);
    ctx.table_with_caption(&table, &table_ref, &config.pattern_table_caption_prefix)?;
    ctx.state.patterns.clear();

    ctx.notes(&action.notes)?;
    ctx.empty_lines()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::render::DocumentState;
    use pretty_assertions::assert_eq;
    use yaml2docx_docx::{DocumentSink, Merge, MemorySink};

    const LONG_PATTERN: &str =
        "^([\\x09\\x0a\\x0d\\x20-\\ud7ff\\ue000-\\ufffd]|\\ud800[\\udc00-\\udfff]|[\\ud801-\\udbfe][\\udc00-\\udfff])*$";

    fn doc() -> OpenApiDocument {
        let yaml = format!(
            r##"
openapi: 3.0.3
components:
  schemas:
    Referable:
      type: object
      required: [idShort]
      properties:
        idShort:
          type: string
          maxLength: 128
          pattern: "{long}"
        category:
          type: string
          minLength: 1
    Kind:
      type: string
      enum: [Instance, Template]
    Property:
      allOf:
        - $ref: "#/components/schemas/Referable"
        - required: [valueType]
          properties:
            kind:
              $ref: "#/components/schemas/Kind"
            valueType:
              type: string
              format: xs
      oneOf:
        - required: [value]
        - required: [valueId]
      properties:
        value:
          type: string
          pattern: "{long}"
        valueId:
          type: string
"##,
            long = LONG_PATTERN.replace('\\', "\\\\")
        );
        OpenApiDocument::from_yaml_str(&yaml).unwrap()
    }

    #[test]
    fn test_constraint_lines() {
        let mut registry = PatternRegistry::new();
        let property = Property {
            enum_values: Some(vec!["A".into(), "B".into()]),
            pattern: Some("^[a-z]+$".into()),
            min_length: Some(1),
            format: Some("uri".into()),
            ..Default::default()
        };
        assert_eq!(
            constraint_lines(&property, &mut registry, 80),
            vec!["Enumeration: A, B", "Pattern: ^[a-z]+$", "Length: 1..*", "Format: uri"]
        );
        assert!(registry.is_empty());

        let long = Property {
            pattern: Some(LONG_PATTERN.to_string()),
            ..Default::default()
        };
        assert_eq!(
            constraint_lines(&long, &mut registry, 80),
            vec!["Pattern: see pattern index 1"]
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_export_schema_table_and_patterns() {
        let doc = doc();
        let config = ExportConfig {
            origin_schema_order: vec!["Referable".to_string()],
            ..Default::default()
        };
        let mut sink = MemorySink::new();
        sink.begin_document().unwrap();
        let mut state = DocumentState::new();
        let mut ctx = RenderContext::new(&config, &mut sink, &mut state);

        let action = ExportAction::new("ExportSchemas");
        assert!(export_schema(&mut ctx, &doc, "Property", &action).unwrap());
        assert_eq!(ctx.state.patterns.len(), 1);
        export_patterns(&mut ctx, &action).unwrap();
        assert!(ctx.state.patterns.is_empty());

        assert_eq!(sink.headings(), vec!["Schema Property"]);
        let tables = sink.tables();
        assert_eq!(tables.len(), 2);
        let table = tables[0];

        assert_eq!(table.rows[0].cells[3].text, "Occurrence");
        assert_eq!(table.rows[1].cells[0].v_merge, Merge::Continue);

        let members: Vec<&str> = table
            .rows
            .iter()
            .skip(2)
            .map(|r| r.cells[0].text.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(members, vec!["category", "idShort", "kind", "value", "valueId", "valueType"]);

        let id_short = table.find_row("idShort").unwrap();
        assert_eq!(id_short.texts(), vec!["idShort", "", "string", "yes", "1", ""]);
        assert_eq!(id_short.cells[5].v_merge, Merge::Continue);

        let kind = table.find_row("kind").unwrap();
        assert_eq!(kind.cells[2].text, "Kind");
        assert_eq!(kind.cells[5].text, "Property");
        assert_eq!(kind.cells[5].v_merge, Merge::Restart);

        assert_eq!(table.find_row("value").unwrap().cells[3].text, "one of");
        assert_eq!(table.find_row("valueType").unwrap().cells[3].text, "yes");

        // both long patterns share one registry entry
        let references: Vec<&str> = table
            .rows
            .iter()
            .filter(|r| r.cells[1].text.contains("see pattern index 1"))
            .map(|r| r.cells[1].text.as_str())
            .collect();
        assert_eq!(references.len(), 2);
        assert_eq!(tables[1].rows.len(), 2);
        assert_eq!(sink.captions()[1].suffix, " \u{2013} Patterns");
    }

    #[test]
    fn test_unknown_schema_is_reported() {
        let doc = doc();
        let config = ExportConfig::default();
        let mut sink = MemorySink::new();
        sink.begin_document().unwrap();
        let mut state = DocumentState::new();
        let mut ctx = RenderContext::new(&config, &mut sink, &mut state);

        let written = export_schema(&mut ctx, &doc, "Nope", &ExportAction::new("ExportSchemas")).unwrap();
        assert!(!written);
        assert_eq!(state.warnings.len(), 1);
        assert!(sink.blocks().is_empty());
    }

    #[test]
    fn test_schemas_to_export_filters_suppressed() {
        let doc = doc();
        let config = ExportConfig {
            suppress_schema_names: vec!["kind".to_string()],
            ..Default::default()
        };
        let mut sink = MemorySink::new();
        let mut state = DocumentState::new();
        let ctx = RenderContext::new(&config, &mut sink, &mut state);

        let mut action = ExportAction::new("ExportSchemas");
        action.include_schemas = vec!["Property".to_string()];
        action.suppress_schemas = vec!["Referable".to_string()];
        assert_eq!(schemas_to_export(&ctx, &doc, &action), vec!["Property"]);
    }

    #[test]
    fn test_patterns_skipped_when_empty() {
        let config = ExportConfig::default();
        let mut sink = MemorySink::new();
        sink.begin_document().unwrap();
        let mut state = DocumentState::new();
        let mut ctx = RenderContext::new(&config, &mut sink, &mut state);
        export_patterns(&mut ctx, &ExportAction::new("ExportPatterns")).unwrap();
        assert!(sink.blocks().is_empty());
    }
}
