//! Document renderer
//!
//! Turns assembled operation views, resolved property bundles and text
//! parts into block writes on a [`DocumentSink`]. Per-document state
//! (table numbering, pattern registry, reported problems) lives in
//! [`DocumentState`] and is owned by the pipeline driver.

pub mod http;
pub mod operation;
pub mod patterns;
pub mod placeholders;
pub mod schema;
pub mod text;

use anyhow::Result;
use tracing::warn;
use yaml2docx_docx::{Caption, DocumentSink, Paragraph, Table};

use crate::config::{ExportConfig, ReplaceTarget};
pub use patterns::PatternRegistry;
pub use placeholders::{substitute, Substitution};

/// Prefix of table bookmark names
pub const TABLE_BOOKMARK_PREFIX: &str = "Yaml2DocxTable";

/// Number and bookmark reserved for an upcoming table
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub number: u32,
    pub bookmark: String,
}

/// Mutable state of one document being rendered
#[derive(Debug, Default)]
pub struct DocumentState {
    next_table: u32,
    pub patterns: PatternRegistry,
    pub warnings: Vec<String>,
    pub tables_written: usize,
    diagrams: usize,
}

impl DocumentState {
    pub fn new() -> Self {
        Self {
            next_table: 1,
            ..Default::default()
        }
    }

    /// Reserve the next table number
    pub fn reserve_table(&mut self) -> TableRef {
        let number = self.next_table.max(1);
        self.next_table = number + 1;
        TableRef {
            number,
            bookmark: format!("{}{}", TABLE_BOOKMARK_PREFIX, number),
        }
    }

    /// Running number of external diagram files
    pub fn next_diagram(&mut self) -> usize {
        self.diagrams += 1;
        self.diagrams
    }
}

/// Everything an export function writes with
pub struct RenderContext<'a> {
    pub config: &'a ExportConfig,
    pub sink: &'a mut dyn DocumentSink,
    pub state: &'a mut DocumentState,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        config: &'a ExportConfig,
        sink: &'a mut dyn DocumentSink,
        state: &'a mut DocumentState,
    ) -> Self {
        Self { config, sink, state }
    }

    /// Log a skipped item and keep it for the generation result
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.state.warnings.push(message);
    }

    pub fn replace(&self, target: ReplaceTarget, text: &str) -> String {
        self.config.reps.apply(target, text)
    }

    pub fn heading(&mut self, text: &str, style: &str) -> Result<()> {
        self.sink.add_heading(text, style)
    }

    pub fn paragraph(&mut self, text: &str, style: &str) -> Result<()> {
        self.sink.add_paragraph(&Paragraph::text(Some(style), text))
    }

    /// Substitution for `%table%` pointing at `table`
    pub fn table_substitution(&self, table: &TableRef) -> Substitution {
        let display = format!("{} {}", self.config.caption_label, table.number);
        if self.config.add_table_captions {
            Substitution::FieldRef {
                bookmark: table.bookmark.clone(),
                display,
            }
        } else {
            Substitution::Text(display)
        }
    }

    /// Body paragraph with `%key%` placeholders replaced
    pub fn body(&mut self, template: &str, substitutions: &[(&str, Substitution)]) -> Result<()> {
        if template.trim().is_empty() {
            return Ok(());
        }
        let paragraph = Paragraph {
            style: Some(self.config.body_style.clone()),
            runs: substitute(template, substitutions),
            ..Default::default()
        };
        self.sink.add_paragraph(&paragraph)
    }

    /// Table followed by its caption when captions are enabled
    pub fn table_with_caption(&mut self, table: &Table, table_ref: &TableRef, caption_text: &str) -> Result<()> {
        self.sink.add_table(table)?;
        self.state.tables_written += 1;

        if self.config.add_table_captions {
            let caption = Caption {
                style: Some(self.config.table_caption_style.clone()),
                prefix: format!("{} ", self.config.caption_label),
                sequence: self.config.caption_label.clone(),
                number: table_ref.number,
                bookmark: table_ref.bookmark.clone(),
                suffix: format!("{}{}", self.config.caption_separator, caption_text),
            };
            self.sink.add_bookmarked_caption(&caption)?;
        }
        Ok(())
    }

    pub fn notes(&mut self, notes: &[String]) -> Result<()> {
        let style = self.config.note_style.clone();
        for note in notes {
            self.paragraph(note, &style)?;
        }
        Ok(())
    }

    /// Configured number of blank paragraphs
    pub fn empty_lines(&mut self) -> Result<()> {
        for _ in 0..self.config.number_empty_lines {
            self.sink.add_paragraph(&Paragraph::empty())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml2docx_docx::{Block, MemorySink, Run};

    #[test]
    fn test_reserve_table_numbers() {
        let mut state = DocumentState::new();
        assert_eq!(state.reserve_table().number, 1);
        let second = state.reserve_table();
        assert_eq!(second.number, 2);
        assert_eq!(second.bookmark, "Yaml2DocxTable2");
    }

    #[test]
    fn test_caption_follows_table() {
        let config = ExportConfig::default();
        let mut sink = MemorySink::new();
        sink.begin_document().unwrap();
        let mut state = DocumentState::new();
        let mut ctx = RenderContext::new(&config, &mut sink, &mut state);

        let table_ref = ctx.state.reserve_table();
        let sub = ctx.table_substitution(&table_ref);
        ctx.body("See %table%.", &[("%table%", sub)]).unwrap();
        ctx.table_with_caption(&Table::new(vec![100], 8), &table_ref, "Test")
            .unwrap();
        ctx.empty_lines().unwrap();

        let blocks = sink.blocks();
        assert_eq!(blocks.len(), 4);
        match &blocks[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.runs[1], Run::field_ref("Yaml2DocxTable1", "Table 1"))
            }
            other => panic!("unexpected block {:?}", other),
        }
        let captions = sink.captions();
        assert_eq!(captions[0].plain_text(), "Table 1 \u{2013} Test");
        assert_eq!(state.tables_written, 1);
    }

    #[test]
    fn test_report_collects_warnings() {
        let config = ExportConfig::default();
        let mut sink = MemorySink::new();
        let mut state = DocumentState::new();
        let mut ctx = RenderContext::new(&config, &mut sink, &mut state);
        ctx.report("Operation X: skipped");
        assert_eq!(state.warnings, vec!["Operation X: skipped".to_string()]);
    }
}
