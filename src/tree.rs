//! Per-chromosome augmented interval tree.
//!
//! Entries are first appended to a [`Vine`] in arrival order. Once loading
//! is done, [`IntervalTree::from_vine`] sorts the vine by start and builds a
//! balanced tree by repeated median selection, annotating every node with
//! the largest end coordinate in its subtree.
//!
//! Nodes live in a single `Vec` laid out in sorted order, so the in-order
//! position of a node is its index and children are plain `u32` offsets.

use crate::store::{EntryIndex, EntryStore};
use std::io::{self, Write};
use std::ops::ControlFlow;

/// Insertion-ordered entries of one chromosome before balancing.
#[derive(Debug, Clone, Default)]
pub struct Vine {
    entries: Vec<EntryIndex>,
}

impl Vine {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, index: EntryIndex) {
        self.entries.push(index);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Node {
    entry: EntryIndex,
    start: u64,
    end: u64,
    /// Maximum end coordinate in this subtree.
    max_end: u64,
    left: Option<u32>,
    right: Option<u32>,
}

/// A balanced, immutable interval tree over entry indices.
#[derive(Debug, Clone)]
pub struct IntervalTree {
    nodes: Vec<Node>,
    root: Option<u32>,
    height: usize,
}

impl IntervalTree {
    /// Balance a vine into a tree.
    ///
    /// The sort is stable, so entries sharing a start keep their insertion
    /// order. The result has height `ceil(log2(n + 1))` whatever order the
    /// entries arrived in.
    pub fn from_vine(vine: Vine, store: &EntryStore) -> Self {
        let mut order = vine.entries;
        order.sort_by_key(|&idx| store[idx].start);

        let mut nodes: Vec<Node> = order
            .into_iter()
            .map(|idx| {
                let entry = &store[idx];
                Node {
                    entry: idx,
                    start: entry.start,
                    end: entry.end,
                    max_end: entry.end,
                    left: None,
                    right: None,
                }
            })
            .collect();

        let len = nodes.len();
        let (root, height) = build_balanced(&mut nodes, 0, len);

        Self {
            nodes,
            root,
            height,
        }
    }

    /// Number of entries in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Entry indices in tree order (ascending start, ties in insertion order).
    pub fn iter(&self) -> impl Iterator<Item = EntryIndex> + '_ {
        self.nodes.iter().map(|n| n.entry)
    }

    /// Call `f` for every entry overlapping `[start, end)`, in tree order.
    ///
    /// Returning `ControlFlow::Break` from `f` stops the walk.
    pub fn visit_overlaps<F>(&self, start: u64, end: u64, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(EntryIndex) -> ControlFlow<()>,
    {
        match self.root {
            Some(root) if start < end => self.visit(root, start, end, &mut f),
            _ => ControlFlow::Continue(()),
        }
    }

    fn visit<F>(&self, idx: u32, start: u64, end: u64, f: &mut F) -> ControlFlow<()>
    where
        F: FnMut(EntryIndex) -> ControlFlow<()>,
    {
        let node = &self.nodes[idx as usize];

        // Nothing below ends past the query start
        if node.max_end <= start {
            return ControlFlow::Continue(());
        }

        if let Some(left) = node.left {
            self.visit(left, start, end, f)?;
        }

        // Right subtree only holds larger starts
        if node.start >= end {
            return ControlFlow::Continue(());
        }

        if node.end > start {
            f(node.entry)?;
        }

        if let Some(right) = node.right {
            self.visit(right, start, end, f)?;
        }

        ControlFlow::Continue(())
    }

    /// Write the tree structure, one node per line, indented by depth.
    pub fn write_to<W: Write>(&self, writer: &mut W, store: &EntryStore) -> io::Result<()> {
        if let Some(root) = self.root {
            self.write_node(writer, store, root, 0)?;
        }
        Ok(())
    }

    fn write_node<W: Write>(
        &self,
        writer: &mut W,
        store: &EntryStore,
        idx: u32,
        depth: usize,
    ) -> io::Result<()> {
        let node = &self.nodes[idx as usize];
        let entry = &store[node.entry];
        writeln!(
            writer,
            "{:indent$}{}-{} {} {} group={} max_end={}",
            "",
            node.start,
            node.end,
            entry.name,
            entry.strand,
            entry.group,
            node.max_end,
            indent = depth * 2
        )?;
        if let Some(left) = node.left {
            self.write_node(writer, store, left, depth + 1)?;
        }
        if let Some(right) = node.right {
            self.write_node(writer, store, right, depth + 1)?;
        }
        Ok(())
    }
}

/// Link `nodes[lo..hi]` into a balanced subtree rooted at the median and
/// fill in `max_end` on the way back up. Returns the root and its height.
fn build_balanced(nodes: &mut [Node], lo: usize, hi: usize) -> (Option<u32>, usize) {
    if lo >= hi {
        return (None, 0);
    }

    let mid = lo + (hi - lo) / 2;
    let (left, left_height) = build_balanced(nodes, lo, mid);
    let (right, right_height) = build_balanced(nodes, mid + 1, hi);

    let mut max_end = nodes[mid].end;
    if let Some(l) = left {
        max_end = max_end.max(nodes[l as usize].max_end);
    }
    if let Some(r) = right {
        max_end = max_end.max(nodes[r as usize].max_end);
    }

    let node = &mut nodes[mid];
    node.left = left;
    node.right = right;
    node.max_end = max_end;

    (Some(mid as u32), 1 + left_height.max(right_height))
}
