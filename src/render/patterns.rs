//! Registry of long patterns, listed in a separate table

use yaml2docx_docx::{Cell, Row, Table};

/// Patterns collected while rendering one document; indices start at 1
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternRegistry {
    patterns: Vec<String>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `pattern`, registering it on first use
    pub fn register(&mut self, pattern: &str) -> usize {
        if let Some(pos) = self.patterns.iter().position(|p| p == pattern) {
            return pos + 1;
        }
        self.patterns.push(pattern.to_string());
        self.patterns.len()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `(index, pattern)` pairs in registration order
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.patterns
            .iter()
            .enumerate()
            .map(|(i, p)| (i + 1, p.as_str()))
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }
}

/// Text shown instead of a pattern that went to the registry
pub fn reference_text(index: usize) -> String {
    format!("Pattern: see pattern index {}", index)
}

/// Two-column lookup table of all registered patterns
pub fn pattern_table(registry: &PatternRegistry, widths: Vec<u32>, border_width: u32) -> Table {
    let mut table = Table::new(widths, border_width);
    table.push(Row::new(vec![Cell::new("Index").bold(), Cell::new("Pattern").bold()]).header());
    for (index, pattern) in registry.entries() {
        table.push(Row::new(vec![Cell::new(index.to_string()), Cell::new(pattern)]).cant_split());
    }
    table
}
