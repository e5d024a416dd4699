//! Paragraph style lookup by display name

use regex::Regex;
use tracing::debug;

use crate::xml::escape_attr;

const NORMAL: &str = "Normal";

#[derive(Debug, Clone, PartialEq)]
struct StyleEntry {
    id: String,
    name: String,
}

/// Maps style display names (as written in the configuration) to style ids.
///
/// Styles found in a template are used as they are. Names not known yet are
/// registered as custom paragraph styles and emitted when the package is
/// written.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    known: Vec<StyleEntry>,
    custom: Vec<StyleEntry>,
}

impl StyleSheet {
    /// Style sheet of a fresh document: only `Normal` exists
    pub fn new() -> Self {
        Self {
            known: vec![StyleEntry {
                id: NORMAL.to_string(),
                name: NORMAL.to_string(),
            }],
            custom: Vec::new(),
        }
    }

    /// Read the styles declared in a `word/styles.xml` part
    pub fn from_styles_xml(xml: &str) -> Self {
        let style_re = Regex::new(r#"(?s)<w:style\b[^>]*?w:styleId="([^"]+)"[^>]*>(.*?)</w:style>"#)
            .expect("static regex");
        let name_re = Regex::new(r#"<w:name\s+w:val="([^"]+)""#).expect("static regex");

        let mut known = Vec::new();
        for cap in style_re.captures_iter(xml) {
            let id = cap[1].to_string();
            let name = name_re
                .captures(&cap[2])
                .map(|n| n[1].to_string())
                .unwrap_or_else(|| id.clone());
            known.push(StyleEntry { id, name });
        }

        debug!("Template declares {} styles", known.len());
        let mut sheet = Self {
            known,
            custom: Vec::new(),
        };
        if sheet.lookup(NORMAL).is_none() {
            sheet.known.push(StyleEntry {
                id: NORMAL.to_string(),
                name: NORMAL.to_string(),
            });
        }
        sheet
    }

    /// Display names of every known style
    pub fn names(&self) -> Vec<&str> {
        self.known
            .iter()
            .chain(self.custom.iter())
            .map(|s| s.name.as_str())
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<&StyleEntry> {
        self.known
            .iter()
            .chain(self.custom.iter())
            .find(|s| s.name.eq_ignore_ascii_case(name) || s.id.eq_ignore_ascii_case(name))
    }

    /// Style id for a display name, registering a custom style if needed
    pub fn resolve(&mut self, name: &str) -> String {
        if let Some(entry) = self.lookup(name) {
            return entry.id.clone();
        }

        let mut id: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if id.is_empty() {
            return NORMAL.to_string();
        }
        while self.known.iter().chain(self.custom.iter()).any(|s| s.id == id) {
            id.push('X');
        }

        debug!("Registering custom style '{}' as '{}'", name, id);
        self.custom.push(StyleEntry {
            id: id.clone(),
            name: name.to_string(),
        });
        id
    }

    /// `<w:style>` definitions of the custom styles registered so far
    pub fn custom_definitions_xml(&self) -> String {
        self.custom.iter().map(style_definition).collect()
    }

    /// Complete `word/styles.xml` part for a fresh document
    pub fn fresh_styles_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
                r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
                r#"<w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial"/><w:sz w:val="20"/>"#,
                r#"</w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault></w:docDefaults>"#,
                r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
                "{}",
                "</w:styles>"
            ),
            self.custom_definitions_xml()
        )
    }
}

fn heading_level(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let rest = lower.strip_prefix("heading")?.trim();
    rest.parse::<u32>().ok().filter(|l| (1..=9).contains(l))
}

fn style_definition(entry: &StyleEntry) -> String {
    let (ppr, rpr) = if let Some(level) = heading_level(&entry.name) {
        let size = 32u32.saturating_sub(4 * (level - 1)).max(22);
        (
            format!(
                r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{}"/></w:pPr>"#,
                level - 1
            ),
            format!(r#"<w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr>"#),
        )
    } else if entry.name.eq_ignore_ascii_case("caption") {
        (
            r#"<w:pPr><w:spacing w:before="120" w:after="240"/></w:pPr>"#.to_string(),
            r#"<w:rPr><w:b/><w:sz w:val="18"/></w:rPr>"#.to_string(),
        )
    } else {
        (String::new(), String::new())
    };

    format!(
        r#"<w:style w:type="paragraph" w:customStyle="1" w:styleId="{}"><w:name w:val="{}"/><w:basedOn w:val="Normal"/><w:qFormat/>{}{}</w:style>"#,
        escape_attr(&entry.id),
        escape_attr(&entry.name),
        ppr,
        rpr
    )
}
