use super::block::{Block, BlockHandle};

#[derive(Debug, Clone, Default, PartialEq)]
struct Slot {
    generation: u32,
    block: Option<Block>,
}

/// Arena-backed forest of blocks.
///
/// Blocks own nothing structurally: children are handles into the arena and the
/// parent is a plain handle back up. Every live handle appears in exactly one child
/// list (or in `roots`). Freed slots are reused with a bumped generation, so a handle
/// to a removed block never resolves to its successor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    slots: Vec<Slot>,
    free: Vec<usize>,
    roots: Vec<BlockHandle>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[BlockHandle] {
        &self.roots
    }

    pub fn get(&self, handle: BlockHandle) -> Option<&Block> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.block.as_ref())
    }

    pub fn get_mut(&mut self, handle: BlockHandle) -> Option<&mut Block> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.block.as_mut())
    }

    pub fn contains(&self, handle: BlockHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Child list of `parent`, or the top-level list for `None`.
    pub fn children_of(&self, parent: Option<BlockHandle>) -> Option<&[BlockHandle]> {
        match parent {
            None => Some(&self.roots),
            Some(h) => self.get(h).map(Block::children),
        }
    }

    /// Number of live blocks.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.block.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every live block, depth first, parents before children.
    pub fn pre_order(&self) -> Vec<BlockHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<BlockHandle> = self.roots.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            out.push(handle);
            if let Some(block) = self.get(handle) {
                stack.extend(block.children.iter().rev().copied());
            }
        }
        out
    }

    /// Appends a block parsed from a document. The depth already on the block is kept.
    /// A stale `parent` makes the block top-level.
    pub(crate) fn push_parsed(&mut self, parent: Option<BlockHandle>, mut block: Block) -> BlockHandle {
        let parent = parent.filter(|&p| self.contains(p));
        block.parent = parent;
        block.children.clear();
        let handle = self.allocate(block);
        match parent {
            Some(p) => {
                if let Some(parent_block) = self.get_mut(p) {
                    parent_block.children.push(handle);
                }
            }
            None => self.roots.push(handle),
        }
        handle
    }

    /// Inserts a detached block at `index` of `parent`'s child list.
    ///
    /// Depth becomes the parent's depth plus one (0 at top level). Returns `None` when
    /// the parent is gone or the index is past the end.
    pub(crate) fn insert(
        &mut self,
        parent: Option<BlockHandle>,
        index: usize,
        mut block: Block,
    ) -> Option<BlockHandle> {
        let depth = match parent {
            None => 0,
            Some(p) => self.get(p)?.depth + 1,
        };
        if index > self.children_of(parent)?.len() {
            return None;
        }
        block.parent = parent;
        block.depth = depth;
        block.children.clear();
        let handle = self.allocate(block);
        let siblings = match parent {
            None => &mut self.roots,
            Some(p) => &mut self.get_mut(p)?.children,
        };
        siblings.insert(index, handle);
        Some(handle)
    }

    /// Detaches the subtree rooted at `index` of `parent`'s child list and frees it.
    ///
    /// Returns the root block with its structural links cleared.
    pub(crate) fn remove(&mut self, parent: Option<BlockHandle>, index: usize) -> Option<Block> {
        let siblings = match parent {
            None => &mut self.roots,
            Some(p) => &mut self.get_mut(p)?.children,
        };
        if index >= siblings.len() {
            return None;
        }
        let handle = siblings.remove(index);
        let mut pending = vec![handle];
        let mut root = None;
        while let Some(h) = pending.pop() {
            if let Some(block) = self.release(h) {
                pending.extend(block.children.iter().copied());
                if h == handle {
                    root = Some(block);
                }
            }
        }
        root.map(|mut block| {
            block.parent = None;
            block.children.clear();
            block.depth = 0;
            block
        })
    }

    fn allocate(&mut self, block: Block) -> BlockHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.block = Some(block);
            return BlockHandle {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            block: Some(block),
        });
        BlockHandle {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn release(&mut self, handle: BlockHandle) -> Option<Block> {
        let slot = self
            .slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)?;
        let block = slot.block.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(block)
    }
}
