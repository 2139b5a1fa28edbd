pub mod blocks;
pub mod inline;
pub mod lines;

#[cfg(test)]
mod tests;

use blockweave_config::{Config, DEFAULT_INDENT_WIDTH};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Page;
use blocks::BlockBuilder;
use lines::{Line, LineKind, classify_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Spaces per nesting level. Zero is treated as one.
    pub indent_width: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl From<&Config> for ParseOptions {
    fn from(config: &Config) -> Self {
        Self {
            indent_width: config.indent_width,
        }
    }
}

/// Tolerated oddities found while parsing. None of them stop the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A bullet indented more than one level below its parent.
    IndentJump {
        line: usize,
        expected_max: usize,
        found: usize,
    },
    /// Leading tabs are not indentation; the line counts as unindented.
    TabIndent { line: usize },
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::IndentJump { line, .. } | Diagnostic::TabIndent { line } => *line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::IndentJump {
                line,
                expected_max,
                found,
            } => write!(
                f,
                "line {line}: indentation level {found} skips levels (at most {expected_max} expected)"
            ),
            Diagnostic::TabIndent { line } => {
                write!(f, "line {line}: tab indentation is not recognised")
            }
        }
    }
}

/// Everything produced from one document.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub page: Page,
    /// Every classified line, including the ones that did not become blocks.
    pub lines: Vec<Line>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Nesting level of a raw line: leading spaces divided by the indent width.
pub fn indent_level(raw: &str, indent_width: usize) -> usize {
    let spaces = raw.chars().take_while(|&c| c == ' ').count();
    spaces / indent_width.max(1)
}

/// Parses a whole document into a page.
///
/// `name` is the source name of the document (usually the file stem). Parsing never
/// fails; suspicious input is reported in [`ParseResult::diagnostics`].
pub fn parse_document(name: &str, text: &str, options: &ParseOptions) -> ParseResult {
    let mut builder = BlockBuilder::new();
    let mut lines = Vec::new();
    let mut tab_lines = Vec::new();
    let mut title = None;

    for (i, raw) in text.split('\n').enumerate() {
        let line = classify_line(i + 1, raw);

        if line.kind != LineKind::Empty && raw.starts_with('\t') {
            tab_lines.push(Diagnostic::TabIndent { line: line.number });
        }
        if title.is_none() && matches!(line.kind, LineKind::Header { .. }) {
            title = Some(line.content.clone());
        }

        lines.push(line.clone());
        builder.push(line, indent_level(raw, options.indent_width));
    }

    let built = builder.finish();
    let mut diagnostics = built.diagnostics;
    diagnostics.extend(tab_lines);
    diagnostics.sort_by_key(Diagnostic::line);

    for diagnostic in &diagnostics {
        log::debug!("{name}: {diagnostic}");
    }

    let page = Page::from_parts(name, title, built.page_properties, built.outline);
    log::debug!(
        "parsed {name}: {} lines, {} blocks",
        lines.len(),
        page.all_blocks().len()
    );

    ParseResult {
        page,
        lines,
        diagnostics,
    }
}
