//! Free paragraphs and text-part output (railroad diagrams, grammars)

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use yaml2docx_docx::{Image, Paragraph};

use super::RenderContext;
use crate::config::{ExportAction, ExportConfig, OutputFormat};
use crate::grammar::ProcessLauncher;
use crate::utils::sanitize_filename;

/// Single paragraph from `paraText`
pub fn export_paragraph(ctx: &mut RenderContext<'_>, action: &ExportAction) -> Result<()> {
    let Some(text) = action.para_text.as_deref() else {
        ctx.report(format!("Action {} has no paraText, skipping", action.action));
        return Ok(());
    };
    let style = action
        .para_style
        .clone()
        .unwrap_or_else(|| ctx.config.body_style.clone());
    ctx.paragraph(text, &style)
}

/// One monospace paragraph per line
pub fn code_lines(ctx: &mut RenderContext<'_>, lines: &[String], style: &str, font_size: Option<f64>) -> Result<()> {
    for line in lines {
        ctx.sink.add_paragraph(&Paragraph::code(Some(style), line.as_str(), font_size))?;
    }
    Ok(())
}

fn part_intro(ctx: &mut RenderContext<'_>, action: &ExportAction) -> Result<()> {
    let config = ctx.config;
    if let Some(heading) = &action.heading {
        ctx.heading(heading, &config.grammar_heading_style)?;
    }
    if let Some(body) = &action.body {
        ctx.paragraph(body, &config.body_style)?;
    }
    Ok(())
}

fn grammar_font_size(ctx: &RenderContext<'_>, action: &ExportAction) -> Option<f64> {
    action.font_size.or(ctx.config.grammar_code_font_size)
}

/// Railroad diagram lines embedded as they are
pub fn export_railroad(ctx: &mut RenderContext<'_>, lines: &[String], action: &ExportAction) -> Result<()> {
    part_intro(ctx, action)?;
    let style = ctx.config.grammar_code_style.clone();
    let font_size = grammar_font_size(ctx, action);
    code_lines(ctx, lines, &style, font_size)?;
    ctx.notes(&action.notes)?;
    ctx.empty_lines()
}

/// Where the SVG of a grammar export is written: next to the document,
/// named after document, source and running number
pub fn svg_path(document: &Path, source: &Path, index: usize) -> PathBuf {
    let doc_stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let source_stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "grammar".to_string());
    let name = format!("{}_{}_{}.svg", doc_stem, source_stem, index);
    document.with_file_name(sanitize_filename(&name))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert the SVG next to it into a PNG and size it for the page
fn diagram_image(config: &ExportConfig, action: &ExportAction, svg: &Path) -> Result<Image> {
    let png = svg.with_extension("png");
    if png.exists() {
        std::fs::remove_file(&png).with_context(|| format!("Failed to remove stale {}", png.display()))?;
    }

    let work_dir = svg
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let in_name = file_name_of(svg);
    let out_name = file_name_of(&png);
    ProcessLauncher::new(&config.docker_svg2bitmap_cmd, &config.docker_svg2bitmap_args)
        .work_dir(work_dir)
        .run(&[], &[("%in-fn%", in_name.as_str()), ("%out-fn%", out_name.as_str())])?;

    let data = std::fs::read(&png).with_context(|| format!("Failed to read {}", png.display()))?;
    let width = action.target_width_cm.unwrap_or(config.grammar_code_target_width_cm);
    let description = action.heading.clone().unwrap_or_else(|| in_name.clone());
    let image = Image::fit_png(out_name, data, width, config.grammar_code_max_height_cm, action.crop_bottom_cm)?;
    info!("Converted diagram {}", png.display());
    Ok(image.with_description(description))
}

/// Grammar lines rendered by the external tool selected by the output format
pub fn export_grammar(
    ctx: &mut RenderContext<'_>,
    lines: &[String],
    action: &ExportAction,
    work_dir: &Path,
    svg_target: &Path,
) -> Result<()> {
    let config = ctx.config;
    let launcher = match action.output_format {
        OutputFormat::Svg => ProcessLauncher::new(&config.docker_build_svg_cmd, &config.docker_build_svg_args),
        OutputFormat::Console | OutputFormat::Utf8 => {
            ProcessLauncher::new(&config.docker_build_text_cmd, &config.docker_build_text_args)
        }
    }
    .work_dir(work_dir);

    let rendered = match launcher.run(lines, &[]) {
        Ok(rendered) => rendered,
        Err(e) => {
            ctx.report(format!("Grammar rendering failed: {:#}", e));
            Vec::new()
        }
    };

    match action.output_format {
        OutputFormat::Console => {
            for line in &rendered {
                println!("{}", line);
            }
            Ok(())
        }
        OutputFormat::Utf8 => {
            part_intro(ctx, action)?;
            let style = config.grammar_code_style.clone();
            let font_size = grammar_font_size(ctx, action);
            code_lines(ctx, &rendered, &style, font_size)?;
            ctx.notes(&action.notes)?;
            ctx.empty_lines()
        }
        OutputFormat::Svg => {
            if rendered.is_empty() {
                return Ok(());
            }
            let mut svg = rendered.join("\n");
            svg.push('\n');
            std::fs::write(svg_target, svg)
                .with_context(|| format!("Failed to write {}", svg_target.display()))?;
            info!("Wrote diagram {}", svg_target.display());

            part_intro(ctx, action)?;
            match diagram_image(config, action, svg_target) {
                Ok(image) => ctx.sink.add_image(&image)?,
                Err(e) => {
                    let file_name = file_name_of(svg_target);
                    ctx.report(format!("Diagram {} not embedded: {:#}", file_name, e));
                    ctx.paragraph(&format!("Diagram: {}", file_name), &config.body_style)?;
                }
            }
            ctx.notes(&action.notes)?;
            ctx.empty_lines()
        }
    }
}
