//! PositionMapper: Plain-Text Mirror <-> Structured Positions
//!
//! Flattens the document tree into the plain text the classifier sees and
//! records, for every plain-text offset, where it lives in the tree.
//!
//! # Separators
//! | Boundary                       | Char | Rule                                   |
//! |--------------------------------|------|----------------------------------------|
//! | table row                      | `\n` | unless the buffer already ends in `\n` |
//! | cell -> cell in a row          | `\t` | always                                 |
//! | hard break                     | `\n` | always                                 |
//! | block entry (p, h, quote, ...) | `\n` | unless empty or already ends in `\n`   |
//!
//! Table boundaries win: the first block opened inside a cell adds nothing.
//! Separators map one way (plain -> structured) to the start of the node
//! that produced them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tree::{DocumentTree, NodeKind, NodeVisit};

// =============================================================================
// PositionMapping
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionMapping {
    plain_text: String,
    /// One entry per plain-text char offset
    plain_to_structured: Vec<usize>,
    /// Real characters only
    structured_to_plain: HashMap<usize, usize>,
}

impl PositionMapping {
    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    /// Plain-text length in chars
    pub fn len(&self) -> usize {
        self.plain_to_structured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plain_to_structured.is_empty()
    }

    pub fn to_structured(&self, plain: usize) -> Option<usize> {
        self.plain_to_structured.get(plain).copied()
    }

    pub fn to_plain(&self, structured: usize) -> Option<usize> {
        self.structured_to_plain.get(&structured).copied()
    }

    /// True for separators inserted at structural boundaries
    pub fn is_synthetic(&self, plain: usize) -> bool {
        match self.to_structured(plain) {
            Some(pos) => self.to_plain(pos) != Some(plain),
            None => false,
        }
    }

    pub fn synthetic_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&o| self.is_synthetic(o))
    }

    /// Structured `[from, to)` covering plain `[start, end)`
    pub fn structured_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end {
            return None;
        }
        let from = self.to_structured(start)?;
        let last = self.to_structured(end - 1)?;
        Some((from, last + 1))
    }

    /// True when plain `[start, end)` is one unbroken run of real characters
    pub fn is_contiguous(&self, start: usize, end: usize) -> bool {
        if start >= end || end > self.len() {
            return false;
        }
        (start..end).all(|o| !self.is_synthetic(o))
            && self.plain_to_structured[start..end]
                .windows(2)
                .all(|w| w[1] == w[0] + 1)
    }
}

// =============================================================================
// PositionMapper
// =============================================================================

#[derive(Debug, Default)]
struct MapBuilder {
    mapping: PositionMapping,
    /// Cells seen in the current table row
    cells_in_row: usize,
    /// Depth of the row/cell whose boundary is already represented
    pending_cell: Option<usize>,
}

impl MapBuilder {
    fn ends_with(&self, c: char) -> bool {
        self.mapping.plain_text.ends_with(c)
    }

    fn push_separator(&mut self, sep: char, pos: usize) {
        self.mapping.plain_text.push(sep);
        self.mapping.plain_to_structured.push(pos);
    }

    fn push_text(&mut self, text: &str, pos: usize) {
        for (i, c) in text.chars().enumerate() {
            let plain = self.mapping.plain_to_structured.len();
            self.mapping.plain_text.push(c);
            self.mapping.plain_to_structured.push(pos + i);
            self.mapping.structured_to_plain.insert(pos + i, plain);
        }
    }

    fn block_boundary(&mut self, pos: usize) {
        if !self.mapping.plain_text.is_empty() && !self.ends_with('\n') {
            self.push_separator('\n', pos);
        }
    }

    fn visit(&mut self, node: NodeVisit<'_>) {
        match node.kind {
            NodeKind::Text => {
                if let Some(text) = node.text {
                    self.push_text(text, node.pos);
                }
                self.pending_cell = None;
            }
            NodeKind::HardBreak => {
                self.push_separator('\n', node.pos);
                self.pending_cell = None;
            }
            NodeKind::TableRow => {
                self.block_boundary(node.pos);
                self.cells_in_row = 0;
                self.pending_cell = Some(node.depth);
            }
            kind if kind.is_table_cell() => {
                if self.cells_in_row > 0 {
                    self.push_separator('\t', node.pos);
                }
                self.cells_in_row += 1;
                self.pending_cell = Some(node.depth);
            }
            kind if kind.is_block() => match self.pending_cell {
                // First block inside a cell: the row/cell boundary already counts
                Some(depth) if node.depth > depth => {}
                _ => {
                    self.pending_cell = None;
                    self.block_boundary(node.pos);
                }
            },
            _ => {}
        }
    }
}

/// Builds position mappings from document trees
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionMapper;

impl PositionMapper {
    pub fn new() -> Self {
        Self
    }

    /// Walk the tree once and build the mirror. Total over any well-formed tree.
    pub fn build_mapping<T: DocumentTree + ?Sized>(&self, root: &T) -> PositionMapping {
        build_mapping(root)
    }
}

pub fn build_mapping<T: DocumentTree + ?Sized>(root: &T) -> PositionMapping {
    let mut builder = MapBuilder::default();
    root.walk(&mut |node| builder.visit(node));
    builder.mapping
}
