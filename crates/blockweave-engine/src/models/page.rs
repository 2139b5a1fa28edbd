use std::collections::BTreeMap;

use super::{Block, BlockHandle, Outline};
use crate::editing::path::{self, AddressError, BlockPath, PathShift};
use crate::parsing::lines::TaskState;

/// A parsed document.
///
/// The page owns its outline and keeps a pre-order list of every block, refreshed
/// after each structural edit made through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    name: String,
    title: Option<String>,
    properties: BTreeMap<String, String>,
    outline: Outline,
    all_blocks: Vec<BlockHandle>,
}

impl Page {
    /// An empty page.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name, None, BTreeMap::new(), Outline::new())
    }

    pub(crate) fn from_parts(
        name: impl Into<String>,
        title: Option<String>,
        properties: BTreeMap<String, String>,
        outline: Outline,
    ) -> Self {
        let all_blocks = outline.pre_order();
        Self {
            name: name.into(),
            title,
            properties,
            outline,
            all_blocks,
        }
    }

    /// Source name, usually the file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content of the first header line.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Name other pages use to link here: the title, or the source name without one.
    pub fn page_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn all_blocks(&self) -> &[BlockHandle] {
        &self.all_blocks
    }

    pub fn block(&self, handle: BlockHandle) -> Option<&Block> {
        self.outline.get(handle)
    }

    /// Every block in pre-order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.all_blocks.iter().filter_map(|&h| self.outline.get(h))
    }

    pub fn find_block(&self, path: &BlockPath) -> Result<BlockHandle, AddressError> {
        path::find_by_path(&self.outline, path)
    }

    pub fn path_of(&self, handle: BlockHandle) -> Option<BlockPath> {
        path::path_of(&self.outline, handle)
    }

    /// Replaces a block's content. Returns `None` for a stale handle.
    pub fn set_block_content(&mut self, handle: BlockHandle, content: &str) -> Option<&Block> {
        let block = self.outline.get_mut(handle)?;
        block.set_content(content);
        Some(&*block)
    }

    pub fn insert_block(
        &mut self,
        path: &BlockPath,
        block: Block,
    ) -> Result<BlockHandle, AddressError> {
        let handle = path::insert_at_path(&mut self.outline, path, block)?;
        self.refresh();
        Ok(handle)
    }

    pub fn remove_block(&mut self, path: &BlockPath) -> Result<Block, AddressError> {
        let block = path::remove_at_path(&mut self.outline, path)?;
        self.refresh();
        Ok(block)
    }

    /// Paths that an insert at `path` would move. Call before [`Page::insert_block`].
    pub fn shifts_for_insert(&self, path: &BlockPath) -> Vec<PathShift> {
        path::compute_shifts(&self.outline, path)
    }

    /// Blocks carrying a task keyword or a checkbox.
    pub fn task_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks().filter(|b| b.task().is_task())
    }

    pub fn blocks_with_state(&self, state: TaskState) -> impl Iterator<Item = &Block> {
        self.blocks().filter(move |b| b.task().state == Some(state))
    }

    /// Non-empty blocks that link to no page.
    pub fn orphan_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks()
            .filter(|b| !b.content().is_empty() && b.references().next().is_none())
    }

    /// Block whose `id::` is `id`, the target of a `((id))` reference.
    pub fn block_by_uuid(&self, id: &str) -> Option<BlockHandle> {
        self.all_blocks
            .iter()
            .copied()
            .find(|&h| self.outline.get(h).and_then(Block::block_id) == Some(id))
    }

    fn refresh(&mut self) {
        self.all_blocks = self.outline.pre_order();
    }
}
