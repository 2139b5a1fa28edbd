use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parsing::{
    inline::{Segment, parse_segments},
    lines::{Line, TaskInfo, classify_content_line, strip_task_prefix},
};

/// Arena handle for a block inside an [`Outline`](super::Outline).
///
/// Handles stay valid until the block is removed; after that they resolve to `None`,
/// even once the slot holds another block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockHandle {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl BlockHandle {
    pub fn index(self) -> usize {
        self.index
    }
}

/// A bullet and everything it carries.
///
/// Content, task info and segments are derived from the lines together; the only way
/// to change them is [`Block::set_content`]. Parent, children and depth belong to the
/// outline that holds the block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: String,
    lines: Vec<Line>,
    content: String,
    task: TaskInfo,
    segments: Vec<Segment>,
    pub(crate) depth: usize,
    pub(crate) parent: Option<BlockHandle>,
    pub(crate) children: Vec<BlockHandle>,
}

impl Block {
    /// A new block for insertion by an editor, identified by a fresh UUID.
    pub fn new(content: &str) -> Self {
        let mut block = Self::from_lines(uuid::Uuid::new_v4().to_string(), Vec::new());
        block.set_content(content);
        block
    }

    /// Builds a block from already classified lines.
    pub fn from_lines(id: impl Into<String>, lines: Vec<Line>) -> Self {
        let mut block = Self {
            id: id.into(),
            lines,
            content: String::new(),
            task: TaskInfo::default(),
            segments: Vec::new(),
            depth: 0,
            parent: None,
            children: Vec::new(),
        };
        block.refresh_derived();
        block
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn task(&self) -> &TaskInfo {
        &self.task
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<BlockHandle> {
        self.parent
    }

    pub fn children(&self) -> &[BlockHandle] {
        &self.children
    }

    /// Replaces the content, re-classifying every line.
    ///
    /// Lines, task info and segments are recomputed before this returns.
    pub fn set_content(&mut self, content: &str) {
        self.lines = content
            .split('\n')
            .enumerate()
            .map(|(i, text)| classify_content_line(i + 1, text, i == 0))
            .collect();
        self.refresh_derived();
    }

    /// The `id::` value from the first line that has one.
    pub fn block_id(&self) -> Option<&str> {
        self.lines.iter().find_map(|l| l.block_id.as_deref())
    }

    /// Properties from all lines. A later line wins on a repeated key.
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.lines
            .iter()
            .flat_map(|l| l.properties.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().flat_map(|l| l.tags.iter().map(String::as_str))
    }

    /// Page names referenced with `[[...]]`, in order, duplicates included.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .flat_map(|l| l.references.iter().map(String::as_str))
    }

    pub fn block_refs(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .flat_map(|l| l.block_refs.iter().map(String::as_str))
    }

    fn refresh_derived(&mut self) {
        self.content = self
            .lines
            .iter()
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.task = self.lines.first().map(|l| l.task).unwrap_or_default();
        self.segments = if self.task.is_task() {
            parse_segments(strip_task_prefix(&self.content))
        } else {
            parse_segments(&self.content)
        };
    }
}
