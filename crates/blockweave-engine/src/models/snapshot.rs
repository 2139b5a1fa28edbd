//! Serializable page snapshots handed to storage and cache collaborators.
//!
//! A snapshot carries the derived fields so readers never need to re-parse, plus the
//! modification time and page dependencies a cache needs for invalidation.

use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

use super::{Block, BlockHandle, Outline, Page};
use crate::parsing::{
    inline::Segment,
    lines::{Line, TaskInfo},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub id: String,
    pub depth: usize,
    pub content: String,
    pub task: TaskInfo,
    pub lines: Vec<Line>,
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub name: String,
    pub title: Option<String>,
    pub source_path: RelativePathBuf,
    pub modified: SystemTime,
    pub properties: BTreeMap<String, String>,
    /// Pages this one links to, each once, in first-seen order.
    pub dependencies: Vec<String>,
    pub blocks: Vec<BlockSnapshot>,
}

impl PageSnapshot {
    /// Whether the source has changed since the snapshot was taken.
    pub fn is_stale(&self, current_modified: SystemTime) -> bool {
        current_modified > self.modified
    }
}

impl Page {
    pub fn snapshot(
        &self,
        source_path: impl Into<RelativePathBuf>,
        modified: SystemTime,
    ) -> PageSnapshot {
        PageSnapshot {
            name: self.name().to_string(),
            title: self.title().map(str::to_string),
            source_path: source_path.into(),
            modified,
            properties: self.properties().clone(),
            dependencies: self.dependencies(),
            blocks: self
                .outline()
                .roots()
                .iter()
                .filter_map(|&h| snapshot_block(self.outline(), h))
                .collect(),
        }
    }

    /// Rebuilds a page from a snapshot. Derived block fields are recomputed from the lines.
    pub fn from_snapshot(snapshot: PageSnapshot) -> Self {
        let mut outline = Outline::new();
        for block in snapshot.blocks {
            restore_block(&mut outline, None, block);
        }
        Page::from_parts(snapshot.name, snapshot.title, snapshot.properties, outline)
    }

    /// Referenced page names, deduplicated, in first-seen order.
    pub fn dependencies(&self) -> Vec<String> {
        let mut seen = Vec::<String>::new();
        for name in self.blocks().flat_map(Block::references) {
            if !seen.iter().any(|s| s == name) {
                seen.push(name.to_string());
            }
        }
        seen
    }
}

fn snapshot_block(outline: &Outline, handle: BlockHandle) -> Option<BlockSnapshot> {
    let block = outline.get(handle)?;
    Some(BlockSnapshot {
        id: block.id().to_string(),
        depth: block.depth(),
        content: block.content().to_string(),
        task: *block.task(),
        lines: block.lines().to_vec(),
        segments: block.segments().to_vec(),
        children: block
            .children()
            .iter()
            .filter_map(|&child| snapshot_block(outline, child))
            .collect(),
    })
}

fn restore_block(outline: &mut Outline, parent: Option<BlockHandle>, snapshot: BlockSnapshot) {
    let mut block = Block::from_lines(snapshot.id, snapshot.lines);
    block.depth = snapshot.depth;
    let handle = outline.push_parsed(parent, block);
    for child in snapshot.children {
        restore_block(outline, Some(handle), child);
    }
}
