//! In-memory sink used for dry runs and tests

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::model::{Caption, Image, Paragraph, Table};
use crate::sink::DocumentSink;

/// One recorded write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Heading { text: String, style: String },
    Paragraph(Paragraph),
    Table(Table),
    Image(Image),
    Caption(Caption),
}

/// Sink that keeps every block in order
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Vec<Block>,
    begun: bool,
    saved: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn tables(&self) -> Vec<&Table> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn captions(&self) -> Vec<&Caption> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Caption(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<&Image> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Image(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, block: Block) -> Result<()> {
        if !self.begun {
            return Err(anyhow!("begin_document must be called before writing"));
        }
        self.blocks.push(block);
        Ok(())
    }
}

impl DocumentSink for MemorySink {
    fn begin_document(&mut self) -> Result<()> {
        self.blocks.clear();
        self.begun = true;
        self.saved = false;
        Ok(())
    }

    fn add_heading(&mut self, text: &str, style: &str) -> Result<()> {
        self.push(Block::Heading {
            text: text.to_string(),
            style: style.to_string(),
        })
    }

    fn add_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        self.push(Block::Paragraph(paragraph.clone()))
    }

    fn add_table(&mut self, table: &Table) -> Result<()> {
        self.push(Block::Table(table.clone()))
    }

    fn add_image(&mut self, image: &Image) -> Result<()> {
        self.push(Block::Image(image.clone()))
    }

    fn add_bookmarked_caption(&mut self, caption: &Caption) -> Result<()> {
        self.push(Block::Caption(caption.clone()))
    }

    fn save_document(&mut self) -> Result<()> {
        self.saved = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_in_order() {
        let mut sink = MemorySink::new();
        sink.begin_document().unwrap();
        sink.add_heading("Operations", "Heading 2").unwrap();
        sink.add_paragraph(&Paragraph::text(None, "body")).unwrap();
        sink.add_table(&Table::new(vec![567], 8)).unwrap();
        sink.save_document().unwrap();

        assert_eq!(sink.blocks().len(), 3);
        assert_eq!(sink.headings(), vec!["Operations"]);
        assert_eq!(sink.tables().len(), 1);
        assert!(sink.is_saved());
    }

    #[test]
    fn test_write_before_begin_fails() {
        let mut sink = MemorySink::new();
        assert!(sink.add_heading("x", "Normal").is_err());
    }
}
