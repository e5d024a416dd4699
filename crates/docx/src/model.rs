//! Block-level content handed to a document sink

use anyhow::{anyhow, bail, Result};
use serde::Serialize;

/// Twips per centimetre (1 inch = 1440 twips).
pub const TWIPS_PER_CM: f64 = 567.0;

/// DrawingML extents are in English Metric Units
pub const EMU_PER_CM: f64 = 360_000.0;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Convert a centimetre value from the configuration into twips
pub fn cm_to_twips(cm: f64) -> u32 {
    if cm <= 0.0 {
        return 0;
    }
    (cm * TWIPS_PER_CM).round() as u32
}

/// A run inside a paragraph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Run {
    /// Literal text
    Text { text: String },

    /// Live cross-reference field bound to a bookmark. `display` is the
    /// cached field result shown until the reader updates fields.
    FieldRef { bookmark: String, display: String },
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Run::Text { text: text.into() }
    }

    pub fn field_ref(bookmark: impl Into<String>, display: impl Into<String>) -> Self {
        Run::FieldRef {
            bookmark: bookmark.into(),
            display: display.into(),
        }
    }

    /// Text a reader would see for this run
    pub fn visible_text(&self) -> &str {
        match self {
            Run::Text { text } => text,
            Run::FieldRef { display, .. } => display,
        }
    }
}

/// A body paragraph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paragraph {
    /// Paragraph style display name
    pub style: Option<String>,

    pub runs: Vec<Run>,

    /// Explicit font size in points, overriding the style
    pub font_size_pt: Option<f64>,

    /// Render runs in a monospace font
    pub monospace: bool,

    /// Box border in eighths of a point. Adjacent paragraphs with the
    /// same border share one box.
    pub border_width: Option<u32>,
}

impl Paragraph {
    /// Paragraph holding a single literal run
    pub fn text(style: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            style: style.map(str::to_string),
            runs: vec![Run::text(text)],
            ..Default::default()
        }
    }

    /// Blank spacer paragraph
    pub fn empty() -> Self {
        Self::text(None, " ")
    }

    /// Monospace code line
    pub fn code(style: Option<&str>, text: impl Into<String>, font_size_pt: Option<f64>) -> Self {
        Self {
            style: style.map(str::to_string),
            runs: vec![Run::text(text)],
            font_size_pt,
            monospace: true,
            border_width: None,
        }
    }

    /// Draw a box of the given width around the paragraph; zero means none
    pub fn bordered(mut self, width: u32) -> Self {
        self.border_width = (width > 0).then_some(width);
        self
    }

    /// Concatenated visible text of all runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(Run::visible_text).collect()
    }
}

/// Merge state of a table cell along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Merge {
    #[default]
    None,
    /// First cell of a merged span
    Restart,
    /// Cell swallowed by the preceding `Restart`
    Continue,
}

/// One table cell. Text may span several lines separated by `\n`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    pub h_merge: Merge,
    pub v_merge: Merge,
    pub bold: bool,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Start a horizontal merge
    pub fn span_start(mut self) -> Self {
        self.h_merge = Merge::Restart;
        self
    }

    /// Continue the horizontal merge started to the left
    pub fn span_continue() -> Self {
        Self {
            h_merge: Merge::Continue,
            ..Default::default()
        }
    }

    /// Start a vertical merge
    pub fn rows_start(mut self) -> Self {
        self.v_merge = Merge::Restart;
        self
    }

    /// Continue the vertical merge started above
    pub fn rows_continue() -> Self {
        Self {
            v_merge: Merge::Continue,
            ..Default::default()
        }
    }

    /// Lines of the cell text
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// One table row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,

    /// Keep the row on one page
    pub cant_split: bool,

    /// Repeat as header row on every page
    pub header: bool,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Default::default()
        }
    }

    pub fn header(mut self) -> Self {
        self.header = true;
        self
    }

    pub fn cant_split(mut self) -> Self {
        self.cant_split = true;
        self
    }

    /// A single cell spanning `columns` grid columns
    pub fn spanning(cell: Cell, columns: usize) -> Self {
        let mut cells = Vec::with_capacity(columns);
        cells.push(cell.span_start());
        for _ in 1..columns {
            cells.push(Cell::span_continue());
        }
        Self::new(cells)
    }

    /// Texts of all cells, in grid order
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

/// A table: fixed grid of column widths plus rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    /// Grid column widths in twips
    pub column_widths: Vec<u32>,

    pub rows: Vec<Row>,

    /// Border width in eighths of a point
    pub border_width: u32,
}

impl Table {
    pub fn new(column_widths: Vec<u32>, border_width: u32) -> Self {
        Self {
            column_widths,
            rows: Vec::new(),
            border_width,
        }
    }

    pub fn columns(&self) -> usize {
        self.column_widths.len()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Text of the cell at grid position, if present
    pub fn cell_text(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(column))
            .map(|c| c.text.as_str())
    }

    /// Find the first row whose first cell has the given text
    pub fn find_row(&self, first_cell: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|r| r.cells.first().map(|c| c.text.as_str()) == Some(first_cell))
    }
}

/// Auto-numbered caption with a bookmark around its number
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Caption {
    pub style: Option<String>,

    /// Literal text before the number, e.g. `"Table "`
    pub prefix: String,

    /// Sequence identifier of the numbering field, e.g. `"Table"`
    pub sequence: String,

    /// Cached field result
    pub number: u32,

    /// Bookmark enclosing prefix and number
    pub bookmark: String,

    /// Literal text after the number
    pub suffix: String,
}

impl Caption {
    /// Text a reader would see, e.g. `Table 3 - Operation X`
    pub fn plain_text(&self) -> String {
        format!("{}{}{}", self.prefix, self.number, self.suffix)
    }

    /// Field instruction of the numbering field
    pub fn field_instruction(&self) -> String {
        format!(" SEQ {} \\* ARABIC ", self.sequence)
    }
}

/// Pixel size from the IHDR header of a PNG stream
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || data[..8] != PNG_SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

/// An inline bitmap
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    /// Name of the media part inside the package
    pub file_name: String,

    /// Alternative text
    pub description: String,

    #[serde(skip)]
    pub data: Vec<u8>,

    /// Displayed size in EMU, after cropping
    pub width_emu: u64,
    pub height_emu: u64,

    /// Share of the source height cut off at the bottom, in 1/1000 percent
    pub crop_bottom: u32,
}

impl Image {
    /// Size a PNG to `target_width_cm`, cut `crop_bottom_cm` off its bottom
    /// edge, then shrink the whole picture if what is left is taller than
    /// `max_height_cm`
    pub fn fit_png(
        file_name: impl Into<String>,
        data: Vec<u8>,
        target_width_cm: f64,
        max_height_cm: Option<f64>,
        crop_bottom_cm: Option<f64>,
    ) -> Result<Self> {
        let (px_width, px_height) =
            png_dimensions(&data).ok_or_else(|| anyhow!("Not a PNG image"))?;
        if px_width == 0 || px_height == 0 {
            bail!("Image has no pixels");
        }
        if !target_width_cm.is_finite() || target_width_cm <= 0.0 {
            bail!("Target width must be positive, got {}", target_width_cm);
        }

        let mut width = target_width_cm;
        let full_height = width * px_height as f64 / px_width as f64;
        let crop = crop_bottom_cm.filter(|c| c.is_finite() && *c > 0.0).unwrap_or(0.0);
        if crop >= full_height {
            bail!("Cropping {} cm leaves nothing of a {:.2} cm high image", crop, full_height);
        }
        let crop_share = crop / full_height;

        let mut height = full_height - crop;
        if let Some(max) = max_height_cm.filter(|m| m.is_finite() && *m > 0.0) {
            if height > max {
                width *= max / height;
                height = max;
            }
        }

        Ok(Self {
            file_name: file_name.into(),
            description: String::new(),
            data,
            width_emu: (width * EMU_PER_CM).round() as u64,
            height_emu: (height * EMU_PER_CM).round() as u64,
            crop_bottom: (crop_share * 100_000.0).round() as u32,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cm_to_twips() {
        assert_eq!(cm_to_twips(1.0), 567);
        assert_eq!(cm_to_twips(2.5), 1418);
        assert_eq!(cm_to_twips(-3.0), 0);
    }

    #[test]
    fn test_spanning_row() {
        let row = Row::spanning(Cell::new("Input Parameter").bold(), 5);
        assert_eq!(row.cells.len(), 5);
        assert_eq!(row.cells[0].h_merge, Merge::Restart);
        assert!(row.cells[0].bold);
        assert!(row.cells[1..].iter().all(|c| c.h_merge == Merge::Continue));
    }

    #[test]
    fn test_paragraph_plain_text() {
        let para = Paragraph {
            style: None,
            runs: vec![Run::text("see "), Run::field_ref("tbl1", "Table 1")],
            ..Default::default()
        };
        assert_eq!(para.plain_text(), "see Table 1");
    }

    #[test]
    fn test_caption_text() {
        let caption = Caption {
            style: None,
            prefix: "Table ".to_string(),
            sequence: "Table".to_string(),
            number: 4,
            bookmark: "tbl4".to_string(),
            suffix: " - Result".to_string(),
        };
        assert_eq!(caption.plain_text(), "Table 4 - Result");
        assert_eq!(caption.field_instruction(), " SEQ Table \\* ARABIC ");
    }

    /// Signature and IHDR chunk of a PNG, enough to read its size
    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(png_dimensions(&png_header(4000, 1000)), Some((4000, 1000)));
        assert_eq!(png_dimensions(b"<svg/>"), None);
    }

    #[test]
    fn test_fit_png_to_width_with_crop() {
        let image = Image::fit_png("a.png", png_header(4000, 1000), 16.0, Some(22.0), Some(1.0)).unwrap();
        assert_eq!(image.width_emu, 5_760_000);
        assert_eq!(image.height_emu, 1_080_000);
        assert_eq!(image.crop_bottom, 25_000);
    }

    #[test]
    fn test_fit_png_caps_height() {
        let image = Image::fit_png("tall.png", png_header(1000, 4000), 16.0, Some(22.0), None).unwrap();
        assert_eq!(image.height_emu, 7_920_000);
        assert_eq!(image.width_emu, 1_980_000);
        assert_eq!(image.crop_bottom, 0);
    }

    #[test]
    fn test_fit_png_rejects_bad_input() {
        assert!(Image::fit_png("x.png", b"GIF89a".to_vec(), 16.0, None, None).is_err());
        assert!(Image::fit_png("x.png", png_header(100, 100), 0.0, None, None).is_err());
        assert!(Image::fit_png("x.png", png_header(100, 100), 4.0, None, Some(4.0)).is_err());
    }

    #[test]
    fn test_bordered_paragraph() {
        let para = Paragraph::code(None, "get:", None).bordered(8);
        assert_eq!(para.border_width, Some(8));
        assert_eq!(Paragraph::code(None, "get:", None).bordered(0).border_width, None);
    }
}
