//! WordprocessingML fragments

use std::fmt::Write as _;

use crate::model::{Caption, Cell, Image, Merge, Paragraph, Run, Table};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

const CELL_FONT: &str = "Arial";
const CELL_FONT_HALF_POINTS: u32 = 16;
const CODE_FONT: &str = "Courier New";

pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

pub fn escape_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

fn text_element(text: &str) -> String {
    format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape_text(text))
}

/// Run content for possibly multi-line text; lines are joined with breaks
fn lines_to_run_content(text: &str) -> String {
    let mut out = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        out.push_str(&text_element(line.trim_end_matches('\r')));
    }
    out
}

fn run_properties(paragraph: &Paragraph) -> String {
    let mut rpr = String::new();
    if paragraph.monospace {
        let _ = write!(
            rpr,
            r#"<w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:cs="{f}"/>"#,
            f = CODE_FONT
        );
    }
    if let Some(size) = paragraph.font_size_pt {
        let half_points = (size * 2.0).round().max(2.0) as u32;
        let _ = write!(rpr, r#"<w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/>"#);
    }
    if rpr.is_empty() {
        rpr
    } else {
        format!("<w:rPr>{rpr}</w:rPr>")
    }
}

fn paragraph_properties(style_id: Option<&str>, border_width: Option<u32>) -> String {
    let mut ppr = String::new();
    if let Some(id) = style_id {
        let _ = write!(ppr, r#"<w:pStyle w:val="{}"/>"#, escape_attr(id));
    }
    if let Some(width) = border_width {
        let _ = write!(
            ppr,
            "<w:pBdr>{}</w:pBdr>",
            border_set(width, &["top", "left", "bottom", "right"])
        );
    }
    if ppr.is_empty() {
        ppr
    } else {
        format!("<w:pPr>{ppr}</w:pPr>")
    }
}

pub fn paragraph_xml(paragraph: &Paragraph, style_id: Option<&str>) -> String {
    let mut out = String::from("<w:p>");
    out.push_str(&paragraph_properties(style_id, paragraph.border_width));

    let rpr = run_properties(paragraph);
    for run in &paragraph.runs {
        match run {
            Run::Text { text } => {
                let _ = write!(out, "<w:r>{}{}</w:r>", rpr, lines_to_run_content(text));
            }
            Run::FieldRef { bookmark, display } => {
                let _ = write!(
                    out,
                    r#"<w:fldSimple w:instr=" REF {} \h "><w:r>{}{}</w:r></w:fldSimple>"#,
                    escape_attr(bookmark),
                    rpr,
                    text_element(display)
                );
            }
        }
    }
    out.push_str("</w:p>");
    out
}

pub fn caption_xml(caption: &Caption, style_id: Option<&str>, bookmark_id: u32) -> String {
    let mut out = String::from("<w:p>");
    if let Some(id) = style_id {
        let _ = write!(out, r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, escape_attr(id));
    }
    let _ = write!(
        out,
        r#"<w:bookmarkStart w:id="{}" w:name="{}"/>"#,
        bookmark_id,
        escape_attr(&caption.bookmark)
    );
    if !caption.prefix.is_empty() {
        let _ = write!(out, "<w:r>{}</w:r>", text_element(&caption.prefix));
    }
    let _ = write!(
        out,
        r#"<w:fldSimple w:instr="{}"><w:r>{}</w:r></w:fldSimple>"#,
        escape_attr(&caption.field_instruction()),
        text_element(&caption.number.to_string())
    );
    let _ = write!(out, r#"<w:bookmarkEnd w:id="{bookmark_id}"/>"#);
    if !caption.suffix.is_empty() {
        let _ = write!(out, "<w:r>{}</w:r>", text_element(&caption.suffix));
    }
    out.push_str("</w:p>");
    out
}

/// Paragraph with one inline picture bound to relationship `rel_id`
pub fn image_xml(image: &Image, rel_id: &str, drawing_id: u32) -> String {
    let cx = image.width_emu;
    let cy = image.height_emu;
    let crop = if image.crop_bottom > 0 {
        format!(r#"<a:srcRect b="{}"/>"#, image.crop_bottom)
    } else {
        String::new()
    };

    let mut out = String::from("<w:p>");
    let _ = write!(
        out,
        concat!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0" xmlns:wp="{wp}">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}" descr="{descr}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="{a}" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic xmlns:a="{a}"><a:graphicData uri="{pic}"><pic:pic xmlns:pic="{pic}">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}" xmlns:r="{r}"/>{crop}<a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
        ),
        wp = WP_NS,
        a = A_NS,
        pic = PIC_NS,
        r = R_NS,
        cx = cx,
        cy = cy,
        id = drawing_id,
        descr = escape_attr(&image.description),
        name = escape_attr(&image.file_name),
        rel = escape_attr(rel_id),
        crop = crop,
    );
    out.push_str("</w:p>");
    out
}

fn border_set(width: u32, names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!(r#"<w:{n} w:val="single" w:sz="{width}" w:space="0" w:color="auto"/>"#))
        .collect()
}

fn cell_xml(cell: &Cell, width: u32, span: usize, border_width: u32) -> String {
    let mut tcpr = format!(r#"<w:tcW w:w="{width}" w:type="dxa"/>"#);
    if span > 1 {
        let _ = write!(tcpr, r#"<w:gridSpan w:val="{span}"/>"#);
    }
    match cell.v_merge {
        Merge::Restart => tcpr.push_str(r#"<w:vMerge w:val="restart"/>"#),
        Merge::Continue => tcpr.push_str("<w:vMerge/>"),
        Merge::None => {}
    }
    let _ = write!(
        tcpr,
        "<w:tcBorders>{}</w:tcBorders>",
        border_set(border_width, &["top", "left", "bottom", "right"])
    );
    tcpr.push_str(concat!(
        r#"<w:tcMar><w:top w:w="40" w:type="dxa"/><w:left w:w="80" w:type="dxa"/>"#,
        r#"<w:bottom w:w="40" w:type="dxa"/><w:right w:w="80" w:type="dxa"/></w:tcMar>"#,
        r#"<w:vAlign w:val="top"/>"#
    ));

    let rpr = format!(
        r#"<w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:cs="{f}"/>{b}<w:sz w:val="{s}"/><w:szCs w:val="{s}"/>"#,
        f = CELL_FONT,
        b = if cell.bold { "<w:b/>" } else { "" },
        s = CELL_FONT_HALF_POINTS
    );

    format!(
        r#"<w:tc><w:tcPr>{}</w:tcPr><w:p><w:pPr><w:spacing w:before="0" w:after="120"/></w:pPr><w:r><w:rPr>{}</w:rPr>{}</w:r></w:p></w:tc>"#,
        tcpr,
        rpr,
        lines_to_run_content(&cell.text)
    )
}

pub fn table_xml(table: &Table) -> String {
    let bw = table.border_width;
    let mut out = String::from("<w:tbl>");
    let _ = write!(
        out,
        r#"<w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblLayout w:type="fixed"/><w:tblBorders>{}</w:tblBorders></w:tblPr>"#,
        border_set(bw, &["top", "left", "bottom", "right", "insideH", "insideV"])
    );

    out.push_str("<w:tblGrid>");
    for w in &table.column_widths {
        let _ = write!(out, r#"<w:gridCol w:w="{w}"/>"#);
    }
    out.push_str("</w:tblGrid>");

    for row in &table.rows {
        out.push_str("<w:tr>");
        if row.cant_split || row.header {
            out.push_str("<w:trPr>");
            if row.cant_split {
                out.push_str("<w:cantSplit/>");
            }
            if row.header {
                out.push_str("<w:tblHeader/>");
            }
            out.push_str("</w:trPr>");
        }

        // horizontal merges become grid spans
        let mut col = 0usize;
        let mut i = 0usize;
        while i < row.cells.len() {
            let cell = &row.cells[i];
            let mut span = 1usize;
            if cell.h_merge == Merge::Restart {
                while i + span < row.cells.len() && row.cells[i + span].h_merge == Merge::Continue {
                    span += 1;
                }
            }
            let width: u32 = table
                .column_widths
                .iter()
                .skip(col)
                .take(span)
                .sum();
            out.push_str(&cell_xml(cell, width, span, bw));
            col += span;
            i += span;
        }
        out.push_str("</w:tr>");
    }

    out.push_str("</w:tbl>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a<b & c"), "a&lt;b &amp; c");
        assert_eq!(escape_attr(r#"x"y"#), "x&quot;y");
    }

    #[test]
    fn test_multiline_cell_breaks() {
        let content = lines_to_run_content("one\ntwo");
        assert_eq!(
            content,
            r#"<w:t xml:space="preserve">one</w:t><w:br/><w:t xml:space="preserve">two</w:t>"#
        );
    }

    #[test]
    fn test_merged_cells_become_grid_span() {
        let mut table = Table::new(vec![100, 200, 300], 8);
        table.push(Row::spanning(Cell::new("all"), 3));
        let xml = table_xml(&table);
        assert!(xml.contains(r#"<w:gridSpan w:val="3"/>"#));
        assert!(xml.contains(r#"<w:tcW w:w="600" w:type="dxa"/>"#));
        assert_eq!(xml.matches("<w:tc>").count(), 1);
    }

    #[test]
    fn test_field_ref_paragraph() {
        let para = Paragraph {
            style: None,
            runs: vec![Run::text("see "), Run::field_ref("tbl_1", "Table 1")],
            ..Default::default()
        };
        let xml = paragraph_xml(&para, Some("BodyText"));
        assert!(xml.contains(r#"<w:pStyle w:val="BodyText"/>"#));
        assert!(xml.contains(r#"<w:fldSimple w:instr=" REF tbl_1 \h ">"#));
    }

    #[test]
    fn test_bordered_code_paragraph() {
        let para = Paragraph::code(Some("Code"), "paths:", Some(8.0)).bordered(4);
        let xml = paragraph_xml(&para, Some("Code"));
        assert!(xml.starts_with(r#"<w:p><w:pPr><w:pStyle w:val="Code"/><w:pBdr>"#));
        assert_eq!(xml.matches(r#"w:sz="4""#).count(), 4);
        assert!(!paragraph_xml(&Paragraph::text(None, "x"), None).contains("<w:pPr>"));
    }

    #[test]
    fn test_image_drawing() {
        let image = Image {
            file_name: "image1.png".to_string(),
            description: r#"Grammar "ids""#.to_string(),
            width_emu: 5_760_000,
            height_emu: 1_080_000,
            crop_bottom: 25_000,
            ..Default::default()
        };
        let xml = image_xml(&image, "rIdImage1", 7);
        assert!(xml.contains(r#"<wp:extent cx="5760000" cy="1080000"/>"#));
        assert!(xml.contains(r#"r:embed="rIdImage1""#));
        assert!(xml.contains(r#"<a:srcRect b="25000"/>"#));
        assert!(xml.contains(r#"descr="Grammar &quot;ids&quot;""#));
        assert!(xml.contains(r#"<wp:docPr id="7""#));
    }
}
