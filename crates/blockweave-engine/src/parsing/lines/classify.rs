use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    extract,
    task::{TaskInfo, parse_task_info},
};

/// Structural role of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Empty,
    /// `#` run at the start of the line; `level` is the run length.
    Header { level: usize },
    /// `-` bullet. The bullet is not part of the content.
    Block,
    PlainText,
}

/// One classified line with the metadata found on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// 1-based.
    pub number: usize,
    pub kind: LineKind,
    /// Trimmed, with the bullet or header marker removed.
    pub content: String,
    pub task: TaskInfo,
    pub references: Vec<String>,
    pub block_refs: Vec<String>,
    pub block_id: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub tags: Vec<String>,
}

impl Line {
    fn bare(number: usize, kind: LineKind, content: String) -> Self {
        Self {
            number,
            kind,
            content,
            task: TaskInfo::default(),
            references: Vec::new(),
            block_refs: Vec::new(),
            block_id: None,
            properties: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    fn with_metadata(number: usize, kind: LineKind, content: String) -> Self {
        let mut line = Self::bare(number, kind, content);
        line.task = parse_task_info(&line.content);
        line.references = extract::page_references(&line.content);
        line.block_refs = extract::block_references(&line.content);
        line.block_id = extract::block_id(&line.content);
        if let Some((key, value)) = extract::property(&line.content) {
            line.properties.insert(key, value);
        }
        line.tags = extract::tags(&line.content);
        line
    }

    pub fn is_empty(&self) -> bool {
        self.kind == LineKind::Empty
    }
}

const BULLET: char = '-';
const HEADING: char = '#';

/// Classifies one line of a document. Never fails: anything unrecognised is plain text.
pub fn classify_line(number: usize, raw: &str) -> Line {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Line::bare(number, LineKind::Empty, String::new());
    }

    if trimmed.starts_with(HEADING) {
        let rest = trimmed.trim_start_matches(HEADING);
        let level = trimmed.len() - rest.len();
        return Line::bare(
            number,
            LineKind::Header { level },
            rest.trim().to_string(),
        );
    }

    if let Some(rest) = trimmed.strip_prefix(BULLET) {
        return Line::with_metadata(number, LineKind::Block, rest.trim().to_string());
    }

    Line::with_metadata(number, LineKind::PlainText, trimmed.to_string())
}

/// Classifies a line of text that already lives inside a block.
///
/// Used when an editor replaces block content: the bullet has been stripped, so a
/// leading `#` is a tag rather than a header. The first line is the block line.
pub fn classify_content_line(number: usize, text: &str, first: bool) -> Line {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Line::bare(number, LineKind::Empty, String::new());
    }

    let kind = if first {
        LineKind::Block
    } else {
        LineKind::PlainText
    };
    Line::with_metadata(number, kind, trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::lines::task::{CheckboxState, TaskState};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", LineKind::Empty, "")]
    #[case("   \t ", LineKind::Empty, "")]
    #[case("# Title", LineKind::Header { level: 1 }, "Title")]
    #[case("### Deep   ", LineKind::Header { level: 3 }, "Deep")]
    #[case("- Item", LineKind::Block, "Item")]
    #[case("    - Nested item", LineKind::Block, "Nested item")]
    #[case("-", LineKind::Block, "")]
    #[case("just words", LineKind::PlainText, "just words")]
    fn classifies_kinds(#[case] raw: &str, #[case] kind: LineKind, #[case] content: &str) {
        let line = classify_line(7, raw);

        assert_eq!(line.number, 7);
        assert_eq!(line.kind, kind);
        assert_eq!(line.content, content);
    }

    #[test]
    fn block_line_with_everything() {
        let line = classify_line(1, "- TODO [#A] Fix bug in [[Project X]] #urgent");

        assert_eq!(line.kind, LineKind::Block);
        assert_eq!(line.content, "TODO [#A] Fix bug in [[Project X]] #urgent");
        assert_eq!(line.task.state, Some(TaskState::Todo));
        assert_eq!(line.task.priority, Some('A'));
        assert_eq!(line.references, vec!["Project X"]);
        assert_eq!(line.tags, vec!["urgent"]);
    }

    #[test]
    fn tags_references_and_block_id_on_one_line() {
        let line = classify_line(1, "- TODO [#A] Fix #bug in [[parser]] id:: abc-123");

        assert_eq!(line.kind, LineKind::Block);
        assert_eq!(line.task.state, Some(TaskState::Todo));
        assert_eq!(line.task.priority, Some('A'));
        assert_eq!(line.tags, vec!["bug"]);
        assert_eq!(line.references, vec!["parser"]);
        assert_eq!(line.block_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn header_lines_get_no_metadata() {
        let line = classify_line(1, "# TODO [[Not a ref]] #nope");

        assert_eq!(line.kind, LineKind::Header { level: 1 });
        assert!(line.references.is_empty());
        assert!(line.tags.is_empty());
        assert_eq!(line.task, TaskInfo::default());
    }

    #[test]
    fn plain_text_property_line() {
        let line = classify_line(2, "  status:: active");

        assert_eq!(line.kind, LineKind::PlainText);
        assert_eq!(
            line.properties,
            BTreeMap::from([("status".to_string(), "active".to_string())])
        );
    }

    #[test]
    fn id_property_becomes_block_id() {
        let line = classify_line(2, "id:: 650a1b2c-d3e4-4f56-a789-0123456789ab");

        assert_eq!(
            line.block_id.as_deref(),
            Some("650a1b2c-d3e4-4f56-a789-0123456789ab")
        );
        assert!(line.properties.is_empty());
    }

    #[test]
    fn checkbox_block() {
        let line = classify_line(1, "- [x] Finished");

        assert_eq!(line.task.checkbox, Some(CheckboxState::Checked));
    }

    #[test]
    fn content_line_never_becomes_header() {
        let line = classify_content_line(1, "#urgent fix the build", true);

        assert_eq!(line.kind, LineKind::Block);
        assert_eq!(line.content, "#urgent fix the build");
        assert_eq!(line.tags, vec!["urgent"]);
    }

    #[test]
    fn content_continuation_lines_are_plain_text() {
        let line = classify_content_line(2, "  priority:: high", false);

        assert_eq!(line.kind, LineKind::PlainText);
        assert_eq!(line.properties.get("priority").map(String::as_str), Some("high"));
    }
}
