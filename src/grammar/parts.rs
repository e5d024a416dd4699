//! Splitting text files into named parts

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// How part boundaries are recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartSyntax {
    /// `name:` on a line of its own starts a part; the header is not content
    RailRoad,
    /// An identifier followed by a non-word character starts a part; the
    /// header line is content
    Grammar,
}

impl PartSyntax {
    fn header_regex(&self) -> Regex {
        let pattern = match self {
            PartSyntax::RailRoad => r"^(\w+):",
            PartSyntax::Grammar => r"^(\w+)\W",
        };
        Regex::new(pattern).expect("static regex")
    }

    fn header_is_content(&self) -> bool {
        matches!(self, PartSyntax::Grammar)
    }
}

/// Named parts of a text file, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct TextParts {
    syntax: PartSyntax,
    parts: IndexMap<String, Vec<String>>,
}

impl TextParts {
    pub fn parse(text: &str, syntax: PartSyntax) -> Self {
        let header = syntax.header_regex();
        let mut parts: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            if let Some(caps) = header.captures(line) {
                let name = caps[1].to_string();
                if parts.contains_key(&name) {
                    warn!("Part {} declared twice, continuing the first one", name);
                }
                let lines = parts.entry(name.clone()).or_default();
                if syntax.header_is_content() {
                    lines.push(line.to_string());
                }
                current = Some(name);
            } else if !line.trim().is_empty() {
                if let Some(lines) = current.as_ref().and_then(|n| parts.get_mut(n)) {
                    lines.push(line.to_string());
                }
            }
        }

        debug!("Split text into {} parts", parts.len());
        Self { syntax, parts }
    }

    pub fn from_file(path: &Path, syntax: PartSyntax) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&text, syntax))
    }

    pub fn syntax(&self) -> PartSyntax {
        self.syntax
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// Lines of the named parts, concatenated in the given order. An empty
    /// selection takes every part. Unknown names are returned separately.
    pub fn select(&self, names: &[String]) -> (Vec<String>, Vec<String>) {
        if names.is_empty() {
            return (self.parts.values().flatten().cloned().collect(), Vec::new());
        }

        let mut lines = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            match self.parts.get(name) {
                Some(part) => lines.extend(part.iter().cloned()),
                None => missing.push(name.clone()),
            }
        }
        (lines, missing)
    }
}
