use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Block, BlockHandle, Outline};

/// Child indices from the top-level list down to a block. `[0, 2]` is the third
/// child of the first top-level block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockPath(Vec<usize>);

impl BlockPath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the `index`th child of this block.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl From<Vec<usize>> for BlockPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for BlockPath {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Where a block moves to when a sibling is inserted before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathShift {
    pub old: BlockPath,
    pub new: BlockPath,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("empty path")]
    EmptyPath,
    /// `max` is the largest valid index at that position, -1 when there are no children.
    #[error("invalid index {index} at path position {position} (max: {max})")]
    InvalidIndex {
        index: usize,
        position: usize,
        max: isize,
    },
    #[error("parent not found: {0}")]
    ParentNotFound(Box<AddressError>),
}

fn max_index(count: usize) -> isize {
    count as isize - 1
}

/// Walks `path` from the top-level list.
pub fn find_by_path(outline: &Outline, path: &BlockPath) -> Result<BlockHandle, AddressError> {
    find_by_indices(outline, path.as_slice())
}

fn find_by_indices(outline: &Outline, indices: &[usize]) -> Result<BlockHandle, AddressError> {
    let mut siblings = outline.roots();
    let mut current = None;

    for (position, &index) in indices.iter().enumerate() {
        let Some(&handle) = siblings.get(index) else {
            return Err(AddressError::InvalidIndex {
                index,
                position,
                max: max_index(siblings.len()),
            });
        };
        current = Some(handle);
        siblings = outline.get(handle).map(Block::children).unwrap_or_default();
    }

    current.ok_or(AddressError::EmptyPath)
}

/// Path of a live block, found by walking parent links upwards.
pub fn path_of(outline: &Outline, handle: BlockHandle) -> Option<BlockPath> {
    let mut indices = Vec::new();
    let mut current = handle;

    loop {
        let parent = outline.get(current)?.parent();
        let siblings = outline.children_of(parent)?;
        indices.push(siblings.iter().position(|&h| h == current)?);
        match parent {
            Some(p) => current = p,
            None => break,
        }
    }

    indices.reverse();
    Some(BlockPath(indices))
}

/// Resolves the parent list addressed by all but the last element of `path`.
fn split_parent(
    outline: &Outline,
    path: &BlockPath,
) -> Result<(Option<BlockHandle>, usize), AddressError> {
    let (&index, parent_indices) = path.as_slice().split_last().ok_or(AddressError::EmptyPath)?;
    if parent_indices.is_empty() {
        return Ok((None, index));
    }
    let parent = find_by_indices(outline, parent_indices)
        .map_err(|e| AddressError::ParentNotFound(Box::new(e)))?;
    Ok((Some(parent), index))
}

/// Inserts `block` so that it ends up at `path`. The last index may equal the current
/// child count, which appends.
///
/// A one-element path inserts into the top-level list.
pub fn insert_at_path(
    outline: &mut Outline,
    path: &BlockPath,
    block: Block,
) -> Result<BlockHandle, AddressError> {
    let (parent, index) = split_parent(outline, path)?;
    let count = outline.children_of(parent).map_or(0, <[BlockHandle]>::len);
    let invalid = AddressError::InvalidIndex {
        index,
        position: path.len() - 1,
        max: count as isize,
    };
    if index > count {
        return Err(invalid);
    }
    log::trace!("insert block {} at {path}", block.id());
    outline.insert(parent, index, block).ok_or(invalid)
}

/// Removes the block at `path` along with its descendants and returns it detached.
pub fn remove_at_path(outline: &mut Outline, path: &BlockPath) -> Result<Block, AddressError> {
    let (parent, index) = split_parent(outline, path)?;
    let count = outline.children_of(parent).map_or(0, <[BlockHandle]>::len);
    let invalid = AddressError::InvalidIndex {
        index,
        position: path.len() - 1,
        max: max_index(count),
    };
    if index >= count {
        return Err(invalid);
    }
    log::trace!("remove block at {path}");
    outline.remove(parent, index).ok_or(invalid)
}

/// Every block with its path, in pre-order.
pub fn paths(outline: &Outline) -> Vec<(BlockHandle, BlockPath)> {
    fn walk(
        outline: &Outline,
        siblings: &[BlockHandle],
        prefix: &BlockPath,
        out: &mut Vec<(BlockHandle, BlockPath)>,
    ) {
        for (index, &handle) in siblings.iter().enumerate() {
            let path = prefix.child(index);
            let children = outline.get(handle).map(Block::children).unwrap_or_default();
            out.push((handle, path.clone()));
            walk(outline, children, &path, out);
        }
    }

    let mut out = Vec::new();
    walk(outline, outline.roots(), &BlockPath::default(), &mut out);
    out
}

/// Paths that change if a block is inserted at `insert_path`, computed against the
/// outline as it is before the insert.
///
/// A block is affected when its path agrees with `insert_path` on every level above
/// the insertion level and its index at that level is at or after the inserted index.
/// Descendants of an affected block move with it.
pub fn compute_shifts(outline: &Outline, insert_path: &BlockPath) -> Vec<PathShift> {
    let Some((&inserted, prefix)) = insert_path.as_slice().split_last() else {
        return Vec::new();
    };
    let level = prefix.len();

    paths(outline)
        .into_iter()
        .filter_map(|(_, old)| {
            let indices = old.as_slice();
            if indices.len() <= level || &indices[..level] != prefix || indices[level] < inserted {
                return None;
            }
            let mut shifted = indices.to_vec();
            shifted[level] += 1;
            Some(PathShift {
                old,
                new: BlockPath(shifted),
            })
        })
        .collect()
}
