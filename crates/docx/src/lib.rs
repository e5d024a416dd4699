//! Document sink abstraction for yaml2docx
//!
//! The renderer never talks to a word processor format directly. It emits
//! block-level writes (headings, paragraphs, tables, pictures, captions) into a
//! [`DocumentSink`]. Two sinks ship with this crate: [`DocxWriter`], which
//! writes a WordprocessingML package, and [`MemorySink`], which records the
//! blocks for dry runs and tests.

pub mod memory;
pub mod model;
pub mod sink;
pub mod styles;
pub mod writer;
mod xml;

pub use memory::{Block, MemorySink};
pub use model::{cm_to_twips, png_dimensions, Caption, Cell, Image, Merge, Paragraph, Row, Run, Table};
pub use sink::DocumentSink;
pub use styles::StyleSheet;
pub use writer::DocxWriter;
