//! The sink interface the renderer writes into

use anyhow::Result;

use crate::model::{Caption, Image, Paragraph, Table};

/// Receiver of block-level document writes.
///
/// Writes are strictly ordered: every call appends after the previous one.
pub trait DocumentSink {
    /// Start a new, empty document body
    fn begin_document(&mut self) -> Result<()>;

    /// Append a heading paragraph in the given style
    fn add_heading(&mut self, text: &str, style: &str) -> Result<()>;

    /// Append a body paragraph
    fn add_paragraph(&mut self, paragraph: &Paragraph) -> Result<()>;

    /// Append a table
    fn add_table(&mut self, table: &Table) -> Result<()>;

    /// Append a paragraph holding one inline picture
    fn add_image(&mut self, image: &Image) -> Result<()>;

    /// Append a numbered caption carrying a bookmark
    fn add_bookmarked_caption(&mut self, caption: &Caption) -> Result<()>;

    /// Finish and persist the document
    fn save_document(&mut self) -> Result<()>;
}
