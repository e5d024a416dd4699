//! Interface operation tables and the operation overview

use anyhow::Result;
use yaml2docx_docx::{Cell, Row, Table};

use super::{RenderContext, Substitution};
use crate::config::{ExportAction, OperationConfig, ParameterInfo, ReplaceTarget};
use crate::openapi::OperationView;

const COLUMNS: usize = 5;

/// Label cell followed by one value cell spanning the remaining columns
fn labelled_row(label: &str, value: Cell, columns: usize) -> Row {
    let mut cells = vec![Cell::new(label), value.span_start()];
    for _ in 2..columns {
        cells.push(Cell::span_continue());
    }
    Row::new(cells)
}

fn parameter_row(ctx: &RenderContext<'_>, info: &ParameterInfo) -> Row {
    Row::new(vec![
        Cell::new(&info.name),
        Cell::new(ctx.replace(ReplaceTarget::Description, &info.description)),
        Cell::new(info.mandatory_text()),
        Cell::new(ctx.replace(ReplaceTarget::TypeSchema, &info.type_name)),
        Cell::new(&info.card),
    ])
    .cant_split()
}

/// Five-column interface table of one operation
pub fn interface_table(ctx: &RenderContext<'_>, view: &OperationView) -> Table {
    let config = ctx.config;
    let mut table = Table::new(config.table_widths(), config.table_cell_border_width);

    table.push(labelled_row(
        "Interface Operation Name",
        Cell::new(&view.operation_id).bold(),
        COLUMNS,
    ));
    table.push(labelled_row(
        "Explanation",
        Cell::new(ctx.replace(ReplaceTarget::Description, &view.explanation)),
        COLUMNS,
    ));
    table.push(Row::new(
        ["Name", "Description", "Mand.", "Type", "Card."]
            .iter()
            .map(|t| Cell::new(*t).bold())
            .collect(),
    ));

    table.push(Row::spanning(Cell::new("Input Parameter").bold(), COLUMNS));
    for info in &view.inputs {
        table.push(parameter_row(ctx, info));
    }

    table.push(Row::spanning(Cell::new("Output Parameter").bold(), COLUMNS));
    for info in &view.outputs {
        table.push(parameter_row(ctx, info));
    }

    table
}

/// Heading, body, table, caption, notes and spacing for one operation
pub fn export_operation(
    ctx: &mut RenderContext<'_>,
    view: &OperationView,
    op_config: &OperationConfig,
    action: &ExportAction,
) -> Result<()> {
    let config = ctx.config;
    let heading = op_config
        .heading
        .clone()
        .unwrap_or_else(|| format!("{}{}", config.table_heading_prefix, view.operation_id));
    ctx.heading(&heading, &config.table_heading_style)?;

    let table_ref = ctx.state.reserve_table();
    let body = op_config
        .body
        .as_deref()
        .or(action.body.as_deref())
        .unwrap_or(&config.body);
    let substitutions = [
        ("%opid%", Substitution::Text(view.operation_id.clone())),
        ("%table%", ctx.table_substitution(&table_ref)),
    ];
    ctx.body(body, &substitutions)?;

    let table = interface_table(ctx, view);
    let caption = format!("{}{}", config.table_caption_prefix, view.operation_id);
    ctx.table_with_caption(&table, &table_ref, &caption)?;

    ctx.notes(&op_config.notes)?;
    ctx.notes(&action.notes)?;
    ctx.empty_lines()
}

/// One overview line
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewEntry {
    pub operation_id: String,
    pub explanation: String,
    /// `VERB /path`
    pub http: String,
}

pub fn overview_table(ctx: &RenderContext<'_>, entries: &[OverviewEntry]) -> Table {
    let config = ctx.config;
    let mut table = Table::new(config.overview_widths(), config.table_cell_border_width);
    table.push(
        Row::new(vec![
            Cell::new("Operation").bold(),
            Cell::new("Explanation").bold(),
            Cell::new("HTTP").bold(),
        ])
        .header(),
    );
    for entry in entries {
        table.push(
            Row::new(vec![
                Cell::new(&entry.operation_id),
                Cell::new(ctx.replace(ReplaceTarget::Description, &entry.explanation)),
                Cell::new(&entry.http),
            ])
            .cant_split(),
        );
    }
    table
}

pub fn export_overview(ctx: &mut RenderContext<'_>, entries: &[OverviewEntry], action: &ExportAction) -> Result<()> {
    let config = ctx.config;
    if let Some(heading) = &action.heading {
        ctx.heading(heading, &config.heading2_style)?;
    }

    let table_ref = ctx.state.reserve_table();
    if let Some(body) = &action.body {
        let substitutions = [("%table%", ctx.table_substitution(&table_ref))];
        ctx.body(body, &substitutions)?;
    }

    let table = overview_table(ctx, entries);
    ctx.table_with_caption(&table, &table_ref, &config.overview_table_caption_prefix)?;
    ctx.notes(&action.notes)?;
    ctx.empty_lines()
}
