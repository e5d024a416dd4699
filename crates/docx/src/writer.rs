//! WordprocessingML (.docx) writer

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::model::{Caption, Image, Paragraph, Table};
use crate::sink::DocumentSink;
use crate::styles::StyleSheet;
use crate::xml::{self, R_NS, W_NS};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

const IMAGE_REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const PNG_DEFAULT: &str = r#"<Default Extension="png" ContentType="image/png"/>"#;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Default Extension="png" ContentType="image/png"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#
);

/// A picture stored in the package's media folder
struct MediaPart {
    rel_id: String,
    /// Path relative to `word/`
    target: String,
    data: Vec<u8>,
}

impl MediaPart {
    fn relationship_xml(&self) -> String {
        format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            xml::escape_attr(&self.rel_id),
            IMAGE_REL_TYPE,
            xml::escape_attr(&self.target)
        )
    }
}

/// A4 portrait with 2.5 cm side margins
const SECTION_PROPERTIES: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
    r#"<w:pgMar w:top="1417" w:right="1417" w:bottom="1134" w:left="1417" w:header="708" w:footer="708" w:gutter="0"/>"#,
    r#"</w:sectPr>"#
);

/// Sink writing a `.docx` package on [`DocumentSink::save_document`].
///
/// Without a template a minimal package is created. With a template, every
/// part of the template is copied and the generated content is appended at
/// the end of the template's body.
pub struct DocxWriter {
    output_path: PathBuf,
    template_path: Option<PathBuf>,
    styles: StyleSheet,
    body: String,
    media: Vec<MediaPart>,
    next_bookmark_id: u32,
    blocks_written: usize,
}

impl DocxWriter {
    /// Writer for a fresh document
    pub fn create(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            template_path: None,
            styles: StyleSheet::new(),
            body: String::new(),
            media: Vec::new(),
            next_bookmark_id: 1,
            blocks_written: 0,
        }
    }

    /// Writer continuing a template document; reads the template's styles
    pub fn from_template(output_path: impl Into<PathBuf>, template_path: &Path) -> Result<Self> {
        let styles_xml = read_part(template_path, STYLES_PART)
            .with_context(|| format!("Failed to read styles of template {:?}", template_path))?;
        let styles = match styles_xml {
            Some(xml) => StyleSheet::from_styles_xml(&xml),
            None => StyleSheet::new(),
        };

        Ok(Self {
            output_path: output_path.into(),
            template_path: Some(template_path.to_path_buf()),
            styles,
            body: String::new(),
            media: Vec::new(),
            next_bookmark_id: 1000,
            blocks_written: 0,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Display names of the styles available to this document
    pub fn style_names(&self) -> Vec<&str> {
        self.styles.names()
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    fn style_id(&mut self, name: Option<&str>) -> Option<String> {
        name.filter(|n| !n.trim().is_empty())
            .map(|n| self.styles.resolve(n))
    }

    fn append(&mut self, fragment: String) {
        self.body.push_str(&fragment);
        self.blocks_written += 1;
    }

    fn media_relationships(&self) -> String {
        self.media.iter().map(MediaPart::relationship_xml).collect()
    }

    fn write_media(&self, zip: &mut ZipWriter<File>, options: SimpleFileOptions) -> Result<()> {
        for part in &self.media {
            zip.start_file(format!("word/{}", part.target), options)?;
            zip.write_all(&part.data)?;
        }
        Ok(())
    }

    fn core_properties() -> String {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
                r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
                r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
                r#"<dc:creator>yaml2docx</dc:creator>"#,
                r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>"#,
                r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#,
                r#"</cp:coreProperties>"#
            ),
            now = now
        )
    }

    fn fresh_document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}{}</w:body></w:document>"#,
            W_NS, R_NS, self.body, SECTION_PROPERTIES
        )
    }

    fn write_fresh(&self) -> Result<()> {
        let file = File::create(&self.output_path)
            .with_context(|| format!("Failed to create {:?}", self.output_path))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 5] = [
            (CONTENT_TYPES_PART, CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            (
                DOCUMENT_RELS_PART,
                insert_before_close(DOCUMENT_RELS, "</Relationships>", &self.media_relationships()),
            ),
            (STYLES_PART, self.styles.fresh_styles_xml()),
            (DOCUMENT_PART, self.fresh_document_xml()),
        ];
        for (name, content) in parts.iter() {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_properties().as_bytes())?;
        self.write_media(&mut zip, options)?;

        zip.finish()?;
        Ok(())
    }

    fn write_from_template(&self, template_path: &Path) -> Result<()> {
        let reader = File::open(template_path)
            .with_context(|| format!("Failed to open template {:?}", template_path))?;
        let mut archive = ZipArchive::new(reader)?;

        let file = File::create(&self.output_path)
            .with_context(|| format!("Failed to create {:?}", self.output_path))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            match name.as_str() {
                DOCUMENT_PART => {
                    let mut content = String::new();
                    entry.read_to_string(&mut content)?;
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(insert_into_body(&content, &self.body)?.as_bytes())?;
                }
                STYLES_PART => {
                    let mut content = String::new();
                    entry.read_to_string(&mut content)?;
                    let merged = insert_before_close(&content, "</w:styles>", &self.styles.custom_definitions_xml());
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(merged.as_bytes())?;
                }
                DOCUMENT_RELS_PART if !self.media.is_empty() => {
                    let mut content = String::new();
                    entry.read_to_string(&mut content)?;
                    let merged = insert_before_close(&content, "</Relationships>", &self.media_relationships());
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(merged.as_bytes())?;
                }
                CONTENT_TYPES_PART if !self.media.is_empty() => {
                    let mut content = String::new();
                    entry.read_to_string(&mut content)?;
                    if !content.contains(r#"Extension="png""#) {
                        content = insert_before_close(&content, "</Types>", PNG_DEFAULT);
                    }
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(content.as_bytes())?;
                }
                _ => {
                    drop(entry);
                    let raw = archive.by_index_raw(i)?;
                    zip.raw_copy_file(raw)?;
                }
            }
        }
        self.write_media(&mut zip, options)?;

        zip.finish()?;
        Ok(())
    }
}

/// Read one part of a package as text, `None` if the part is absent
fn read_part(package: &Path, part: &str) -> Result<Option<String>> {
    let reader = File::open(package)?;
    let mut archive = ZipArchive::new(reader)?;
    let mut entry = match archive.by_name(part) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Insert body XML before the final section properties of a document part
fn insert_into_body(document_xml: &str, body: &str) -> Result<String> {
    let body_end = document_xml
        .rfind("</w:body>")
        .ok_or_else(|| anyhow!("Template document has no body"))?;
    let insert_at = match document_xml[..body_end].rfind("<w:sectPr") {
        Some(pos) if !document_xml[pos..body_end].contains("</w:p>") => pos,
        _ => body_end,
    };

    let mut out = String::with_capacity(document_xml.len() + body.len());
    out.push_str(&document_xml[..insert_at]);
    out.push_str(body);
    out.push_str(&document_xml[insert_at..]);
    Ok(out)
}

/// Insert `fragment` before the last `close` tag of a part
fn insert_before_close(part_xml: &str, close: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        return part_xml.to_string();
    }
    match part_xml.rfind(close) {
        Some(pos) => format!("{}{}{}", &part_xml[..pos], fragment, &part_xml[pos..]),
        None => part_xml.to_string(),
    }
}

impl DocumentSink for DocxWriter {
    fn begin_document(&mut self) -> Result<()> {
        debug!("Beginning document {:?}", self.output_path);
        self.body.clear();
        self.media.clear();
        self.blocks_written = 0;
        Ok(())
    }

    fn add_heading(&mut self, text: &str, style: &str) -> Result<()> {
        let id = self.style_id(Some(style));
        let para = Paragraph::text(Some(style), text);
        self.append(xml::paragraph_xml(&para, id.as_deref()));
        Ok(())
    }

    fn add_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let id = self.style_id(paragraph.style.as_deref());
        self.append(xml::paragraph_xml(paragraph, id.as_deref()));
        Ok(())
    }

    fn add_table(&mut self, table: &Table) -> Result<()> {
        self.append(xml::table_xml(table));
        Ok(())
    }

    fn add_image(&mut self, image: &Image) -> Result<()> {
        let n = self.media.len() + 1;
        let part = MediaPart {
            rel_id: format!("rIdYaml2DocxImage{}", n),
            target: format!("media/yaml2docx_{}_{}", n, image.file_name),
            data: image.data.clone(),
        };
        debug!("Embedding {} as {}", image.file_name, part.target);
        let drawing_id = self.next_bookmark_id;
        self.next_bookmark_id += 1;
        self.append(xml::image_xml(image, &part.rel_id, drawing_id));
        self.media.push(part);
        Ok(())
    }

    fn add_bookmarked_caption(&mut self, caption: &Caption) -> Result<()> {
        let id = self.style_id(caption.style.as_deref());
        let bookmark_id = self.next_bookmark_id;
        self.next_bookmark_id += 1;
        self.append(xml::caption_xml(caption, id.as_deref(), bookmark_id));
        Ok(())
    }

    fn save_document(&mut self) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        match self.template_path.clone() {
            Some(template) => self.write_from_template(&template)?,
            None => self.write_fresh()?,
        }

        info!(
            "Wrote {} blocks to {:?}",
            self.blocks_written, self.output_path
        );
        Ok(())
    }
}
