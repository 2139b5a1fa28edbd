use std::collections::BTreeMap;

use crate::models::{Block, BlockHandle, Outline};
use crate::parsing::{
    Diagnostic,
    lines::{Line, LineKind},
};

/// A block whose lines are still being collected.
#[derive(Debug)]
struct OpenBlock {
    parent: Option<BlockHandle>,
    depth: usize,
    lines: Vec<Line>,
}

/// Output of [`BlockBuilder::finish`].
#[derive(Debug, Default)]
pub struct BuiltOutline {
    pub outline: Outline,
    /// Properties written above the first bullet.
    pub page_properties: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Stack machine turning classified lines into a block forest.
///
/// The stack holds the chain of blocks the next line could nest under, each with its
/// depth. A bullet pops every entry at its own depth or deeper, takes the remaining top
/// as its parent and is pushed. Depth is the indentation level as written; a bullet
/// that jumps several levels is accepted and reported.
pub struct BlockBuilder {
    outline: Outline,
    stack: Vec<(BlockHandle, usize)>,
    open: Option<OpenBlock>,
    next_id: usize,
    seen_block: bool,
    page_properties: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            outline: Outline::new(),
            stack: Vec::new(),
            open: None,
            next_id: 1,
            seen_block: false,
            page_properties: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line, indent: usize) {
        match line.kind {
            LineKind::Empty | LineKind::Header { .. } => {}
            LineKind::Block => self.open_block(line, indent),
            LineKind::PlainText => self.plain_text(line, indent),
        }
    }

    pub fn finish(mut self) -> BuiltOutline {
        self.flush();
        BuiltOutline {
            outline: self.outline,
            page_properties: self.page_properties,
            diagnostics: self.diagnostics,
        }
    }

    fn open_block(&mut self, line: Line, indent: usize) {
        self.flush();
        self.seen_block = true;

        while self.stack.last().is_some_and(|&(_, depth)| depth >= indent) {
            self.stack.pop();
        }
        let parent = self.stack.last().copied();

        let expected_max = parent.map_or(0, |(_, depth)| depth + 1);
        if indent > expected_max {
            self.diagnostics.push(Diagnostic::IndentJump {
                line: line.number,
                expected_max,
                found: indent,
            });
        }

        self.open = Some(OpenBlock {
            parent: parent.map(|(handle, _)| handle),
            depth: indent,
            lines: vec![line],
        });
    }

    fn plain_text(&mut self, line: Line, indent: usize) {
        if let Some(open) = self.open.as_mut()
            && indent > open.depth
        {
            open.lines.push(line);
            return;
        }

        if !self.seen_block {
            self.page_properties.extend(line.properties);
        }
    }

    fn flush(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        let id = format!("block-{}", self.next_id);
        self.next_id += 1;

        let mut block = Block::from_lines(id, open.lines);
        block.depth = open.depth;
        let handle = self.outline.push_parsed(open.parent, block);
        self.stack.push((handle, open.depth));
    }
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
