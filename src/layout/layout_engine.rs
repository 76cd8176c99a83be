//! # Layout tree
//!
//! ## Purpose
//! Arena of typeset layout nodes. Every node is addressed by a `LayoutId` handle, knows its
//! parent and its ordered children and caches its geometry lazily.
//!
//! ## Main Structures
//! - `LayoutTree`: the arena, its root and a free list of recycled slots
//! - `LayoutNode`: shape, links and `Cell` caches for size, baseline and absolute origin
//!
//! ## Interesting Code Features
//! - sizes and baselines are computed bottom-up on first read and invalidated for the edited
//!   node and all its ancestors
//! - absolute origins are stamped with an epoch; any structural edit bumps the epoch so every
//!   origin is recomputed top-down on the next read
//! - a `Parenthesis` leaf is sized from the siblings it encloses, so invalidating a run also
//!   invalidates the parentheses inside it
//!
//! Structural invariants kept by the editing primitives: the root is a `Horizontal`, every
//! compound slot is a `Horizontal`, no `Horizontal` directly holds another one, an empty
//! compound slot holds a single visible placeholder.

use crate::layout::layout_geometry::{
    GLYPH_BASELINE, GLYPH_HEIGHT, KDCoordinate, KDPoint, KDRect, KDSize,
};
use crate::layout::layout_shapes::{
    ChildMetrics, EmptyColor, HorizontalLayout, LayoutKind, LayoutShape, MatrixLayout,
    VerticalPosition,
};
use crate::symbolic::symbolic_engine::write_text_in_buffer;
use log::debug;
use std::cell::Cell;
use std::fmt;
use tabled::{builder::Builder, settings::Style};

/// Handle of a node in a `LayoutTree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutId(pub u32);

impl LayoutId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub kind: LayoutKind,
    parent: Option<LayoutId>,
    children: Vec<LayoutId>,
    size: Cell<Option<KDSize>>,
    baseline: Cell<Option<KDCoordinate>>,
    origin: Cell<Option<(u64, KDPoint)>>,
}

impl LayoutNode {
    fn new(kind: LayoutKind) -> Self {
        LayoutNode {
            kind,
            parent: None,
            children: Vec::new(),
            size: Cell::new(None),
            baseline: Cell::new(None),
            origin: Cell::new(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutTree {
    nodes: Vec<Option<LayoutNode>>,
    free: Vec<u32>,
    root: LayoutId,
    origin_epoch: Cell<u64>,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    /// Empty tree: a root run holding one hidden placeholder.
    pub fn new() -> Self {
        let mut tree = LayoutTree::with_root(LayoutKind::Horizontal(HorizontalLayout));
        let placeholder = tree.add_leaf(LayoutKind::empty(EmptyColor::Yellow, false));
        tree.append_child(tree.root, placeholder);
        tree
    }

    /// Tree whose root is a fresh node of `kind` without children.
    pub fn with_root(kind: LayoutKind) -> Self {
        let mut tree = LayoutTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: LayoutId(0),
            origin_epoch: Cell::new(0),
        };
        tree.root = tree.add_leaf(kind);
        tree
    }

    //___________________________________NODE ACCESS____________________________________

    pub fn root(&self) -> LayoutId {
        self.root
    }

    pub fn set_root(&mut self, root: LayoutId) {
        assert!(self.node(root).kind.is_horizontal(), "the root must be a horizontal run");
        self.node_mut(root).parent = None;
        self.root = root;
        self.invalidate(root);
    }

    fn node(&self, id: LayoutId) -> &LayoutNode {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("layout handle {} does not point at a live node", id),
        }
    }

    fn node_mut(&mut self, id: LayoutId) -> &mut LayoutNode {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("layout handle {} does not point at a live node", id),
        }
    }

    pub fn contains(&self, id: LayoutId) -> bool {
        matches!(self.nodes.get(id.index()), Some(Some(_)))
    }

    pub fn kind(&self, id: LayoutId) -> &LayoutKind {
        &self.node(id).kind
    }

    pub fn set_kind(&mut self, id: LayoutId, kind: LayoutKind) {
        self.node_mut(id).kind = kind;
        self.invalidate(id);
    }

    pub fn parent(&self, id: LayoutId) -> Option<LayoutId> {
        self.node(id).parent
    }

    pub fn children(&self, id: LayoutId) -> &[LayoutId] {
        &self.node(id).children
    }

    pub fn child(&self, id: LayoutId, index: usize) -> LayoutId {
        self.node(id).children[index]
    }

    pub fn number_of_children(&self, id: LayoutId) -> usize {
        self.node(id).children.len()
    }

    pub fn index_in_parent(&self, id: LayoutId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn is_horizontal(&self, id: LayoutId) -> bool {
        self.kind(id).is_horizontal()
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_of(&self, ancestor: LayoutId, id: LayoutId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether a run holds nothing but a placeholder (or nothing at all).
    pub fn is_empty_slot(&self, id: LayoutId) -> bool {
        let children = self.children(id);
        match children {
            [] => true,
            [only] => self.kind(*only).is_empty(),
            _ => false,
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: LayoutId) -> Vec<LayoutId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// Pre-order list of the subtree rooted at `id`.
    pub fn descendants(&self, id: LayoutId) -> Vec<LayoutId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        result
    }

    //___________________________________STRUCTURE EDITS____________________________________

    pub fn add_leaf(&mut self, kind: LayoutKind) -> LayoutId {
        let node = LayoutNode::new(kind);
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot as usize] = Some(node);
                LayoutId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                LayoutId((self.nodes.len() - 1) as u32)
            }
        }
    }

    /// New node of `kind` adopting `children`, which must be detached.
    pub fn add_node(&mut self, kind: LayoutKind, children: Vec<LayoutId>) -> LayoutId {
        if let Some(expected) = kind.expected_children() {
            assert_eq!(
                expected,
                children.len(),
                "{} expects {} children",
                kind.name(),
                expected
            );
        }
        let id = self.add_leaf(kind);
        for child in &children {
            assert!(self.parent(*child).is_none(), "child {} is still attached", child);
            self.node_mut(*child).parent = Some(id);
        }
        self.node_mut(id).children = children;
        id
    }

    /// Compound slot holding `contents`; nested runs are flattened and an empty list gets a
    /// visible placeholder.
    pub fn slot(&mut self, contents: Vec<LayoutId>) -> LayoutId {
        let mut flat = Vec::with_capacity(contents.len());
        for id in contents {
            if self.is_horizontal(id) {
                let inner = std::mem::take(&mut self.node_mut(id).children);
                for child in &inner {
                    self.node_mut(*child).parent = None;
                }
                self.release(id);
                flat.extend(inner);
            } else {
                flat.push(id);
            }
        }
        if flat.is_empty() {
            flat.push(self.add_leaf(LayoutKind::empty(EmptyColor::Yellow, true)));
        }
        self.add_node(LayoutKind::Horizontal(HorizontalLayout), flat)
    }

    /// Empty compound slot.
    pub fn empty_slot(&mut self) -> LayoutId {
        self.slot(Vec::new())
    }

    /// Slot holding one grey matrix decoration cell.
    pub fn grey_slot(&mut self) -> LayoutId {
        let grey = self.add_leaf(LayoutKind::empty(EmptyColor::Grey, true));
        self.add_node(LayoutKind::Horizontal(HorizontalLayout), vec![grey])
    }

    pub fn insert_child(&mut self, parent: LayoutId, index: usize, child: LayoutId) {
        assert!(self.parent(child).is_none(), "child {} is still attached", child);
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
        self.invalidate(parent);
    }

    pub fn append_child(&mut self, parent: LayoutId, child: LayoutId) {
        let index = self.number_of_children(parent);
        self.insert_child(parent, index, child);
    }

    /// Detaches and returns child `index` of `parent`; the child stays allocated.
    pub fn remove_child(&mut self, parent: LayoutId, index: usize) -> LayoutId {
        let child = self.node_mut(parent).children.remove(index);
        self.node_mut(child).parent = None;
        self.invalidate(parent);
        child
    }

    /// Puts `new_child` in the slot of child `index` and returns the detached old child.
    pub fn replace_child(&mut self, parent: LayoutId, index: usize, new_child: LayoutId) -> LayoutId {
        assert!(self.parent(new_child).is_none(), "child {} is still attached", new_child);
        let old = std::mem::replace(&mut self.node_mut(parent).children[index], new_child);
        self.node_mut(old).parent = None;
        self.node_mut(new_child).parent = Some(parent);
        self.invalidate(parent);
        old
    }

    /// Replaces `old` (attached) by `new` (detached) and returns `old` detached.
    pub fn replace(&mut self, old: LayoutId, new: LayoutId) -> LayoutId {
        match (self.parent(old), self.index_in_parent(old)) {
            (Some(parent), Some(index)) => self.replace_child(parent, index, new),
            _ => {
                self.set_root(new);
                old
            }
        }
    }

    /// Detaches every child of `id` and returns them in order.
    pub fn take_children(&mut self, id: LayoutId) -> Vec<LayoutId> {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in &children {
            self.node_mut(*child).parent = None;
        }
        self.invalidate(id);
        children
    }

    /// Frees `id` and all its descendants; `id` must be detached.
    pub fn free_subtree(&mut self, id: LayoutId) {
        assert!(
            self.parent(id).is_none() && id != self.root,
            "freeing an attached layout {}",
            id
        );
        for node in self.descendants(id) {
            self.release(node);
        }
    }

    fn release(&mut self, id: LayoutId) {
        self.nodes[id.index()] = None;
        self.free.push(id.0);
    }

    /// Inserts `id` in run `horizontal` at `index`. A run is merged child by child, and a lone
    /// placeholder is replaced. Returns the range of inserted children.
    pub fn insert_in_horizontal(
        &mut self,
        horizontal: LayoutId,
        index: usize,
        id: LayoutId,
    ) -> std::ops::Range<usize> {
        assert!(self.is_horizontal(horizontal), "{} is not a horizontal run", horizontal);
        let mut index = index;
        if self.is_empty_slot(horizontal) && self.number_of_children(horizontal) == 1 {
            let placeholder = self.remove_child(horizontal, 0);
            self.free_subtree(placeholder);
            index = 0;
        }
        let items = if self.is_horizontal(id) {
            let inner = self.take_children(id);
            self.release(id);
            inner
        } else {
            vec![id]
        };
        let count = items.len();
        for (offset, item) in items.into_iter().enumerate() {
            self.insert_child(horizontal, index + offset, item);
        }
        index..index + count
    }

    /// Puts a placeholder back into a run that lost all its children.
    pub fn refill_if_empty(&mut self, horizontal: LayoutId) {
        if self.number_of_children(horizontal) == 0 {
            let visible = horizontal != self.root;
            let placeholder = self.add_leaf(LayoutKind::empty(EmptyColor::Yellow, visible));
            self.append_child(horizontal, placeholder);
        }
    }

    /// Deep copy of `id` (from `source`) into this arena, detached.
    pub fn import_subtree(&mut self, source: &LayoutTree, id: LayoutId) -> LayoutId {
        let children: Vec<LayoutId> = source
            .children(id)
            .iter()
            .map(|child| self.import_subtree(source, *child))
            .collect();
        self.add_node(*source.kind(id), children)
    }

    /// Deep copy of `id` within this arena, detached.
    pub fn copy_subtree(&mut self, id: LayoutId) -> LayoutId {
        let source = self.clone();
        self.import_subtree(&source, id)
    }

    //___________________________________GEOMETRY____________________________________

    /// Drops cached geometry of `id` and its ancestors, and every cached origin.
    pub fn invalidate(&self, id: LayoutId) {
        self.origin_epoch.set(self.origin_epoch.get() + 1);
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            node.size.set(None);
            node.baseline.set(None);
            if node.kind.is_horizontal() {
                for child in &node.children {
                    let child_node = self.node(*child);
                    if child_node.kind.is_parenthesis() {
                        child_node.size.set(None);
                        child_node.baseline.set(None);
                    }
                }
            }
            current = node.parent;
        }
    }

    fn metrics(&self, id: LayoutId) -> ChildMetrics {
        ChildMetrics::new(self.size(id), self.baseline(id))
    }

    /// Metrics a shape needs: its children, or for a parenthesis the run it encloses.
    fn shape_inputs(&self, id: LayoutId) -> Vec<ChildMetrics> {
        let node = self.node(id);
        if node.kind.is_parenthesis() {
            return self.enclosed_metrics(id).into_iter().collect();
        }
        node.children.iter().map(|c| self.metrics(*c)).collect()
    }

    /// Ascent and descent of the siblings between `id` and its matching parenthesis.
    fn enclosed_metrics(&self, id: LayoutId) -> Option<ChildMetrics> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        let siblings = self.children(parent);
        let enclosed: Vec<LayoutId> = if self.kind(id).is_left_parenthesis() {
            let mut depth = 0usize;
            siblings[index + 1..]
                .iter()
                .take_while(|s| {
                    let kind = self.kind(**s);
                    if kind.is_left_parenthesis() {
                        depth += 1;
                    } else if kind.is_right_parenthesis() {
                        if depth == 0 {
                            return false;
                        }
                        depth -= 1;
                    }
                    true
                })
                .copied()
                .collect()
        } else {
            let mut depth = 0usize;
            siblings[..index]
                .iter()
                .rev()
                .take_while(|s| {
                    let kind = self.kind(**s);
                    if kind.is_right_parenthesis() {
                        depth += 1;
                    } else if kind.is_left_parenthesis() {
                        if depth == 0 {
                            return false;
                        }
                        depth -= 1;
                    }
                    true
                })
                .copied()
                .collect()
        };
        let inner: Vec<ChildMetrics> = enclosed
            .into_iter()
            .filter(|s| !self.kind(*s).is_parenthesis())
            .map(|s| self.metrics(s))
            .collect();
        if inner.is_empty() {
            return None;
        }
        let ascent = inner.iter().map(|m| m.baseline).max().unwrap_or(GLYPH_BASELINE);
        let descent = inner
            .iter()
            .map(|m| m.descent())
            .max()
            .unwrap_or(GLYPH_HEIGHT - GLYPH_BASELINE);
        Some(ChildMetrics::new(KDSize::new(0, ascent + descent), ascent))
    }

    pub fn size(&self, id: LayoutId) -> KDSize {
        let node = self.node(id);
        if let Some(size) = node.size.get() {
            return size;
        }
        let size = node.kind.compute_size(&self.shape_inputs(id));
        node.size.set(Some(size));
        size
    }

    pub fn baseline(&self, id: LayoutId) -> KDCoordinate {
        let node = self.node(id);
        if let Some(baseline) = node.baseline.get() {
            return baseline;
        }
        let baseline = node.kind.compute_baseline(&self.shape_inputs(id));
        node.baseline.set(Some(baseline));
        baseline
    }

    /// Position of `id` relative to the root's top-left corner.
    pub fn absolute_origin(&self, id: LayoutId) -> KDPoint {
        let node = self.node(id);
        let epoch = self.origin_epoch.get();
        if let Some((stamp, origin)) = node.origin.get() {
            if stamp == epoch {
                return origin;
            }
        }
        let origin = match (node.parent, self.index_in_parent(id)) {
            (Some(parent), Some(index)) => {
                let parent_node = self.node(parent);
                let inputs = self.shape_inputs(parent);
                self.absolute_origin(parent)
                    .translated_by(parent_node.kind.position_of_child(index, &inputs))
            }
            _ => KDPoint::ORIGIN,
        };
        node.origin.set(Some((epoch, origin)));
        origin
    }

    pub fn rect(&self, id: LayoutId) -> KDRect {
        KDRect::from_origin_and_size(self.absolute_origin(id), self.size(id))
    }

    /// Size the whole tree needs to be displayed without scrolling.
    pub fn minimal_size(&self) -> KDSize {
        self.size(self.root)
    }

    //___________________________________COUNTS____________________________________

    pub fn number_of_descendants(&self, id: LayoutId, include_self: bool) -> usize {
        let all = self.descendants(id).len();
        if include_self { all } else { all - 1 }
    }

    /// Nodes counted against the field's ceiling: everything but matrix decorations.
    pub fn number_of_layouts(&self) -> usize {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| !self.is_decoration(*id))
            .count()
    }

    /// Grey cells and the runs holding them.
    fn is_decoration(&self, id: LayoutId) -> bool {
        let kind = self.kind(id);
        if kind.is_grey_empty() {
            return true;
        }
        kind.is_horizontal() && self.is_grey_slot(id)
    }

    /// Whether `id` is a run holding one grey cell.
    pub fn is_grey_slot(&self, id: LayoutId) -> bool {
        match self.children(id) {
            [only] => self.is_horizontal(id) && self.kind(*only).is_grey_empty(),
            _ => false,
        }
    }

    /// Number of live nodes in the arena, attached or not.
    pub fn allocated(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    //___________________________________MATRICES____________________________________

    pub fn matrix_dimensions(&self, id: LayoutId) -> (usize, usize) {
        match self.kind(id) {
            LayoutKind::Matrix(MatrixLayout { rows, columns }) => (*rows, *columns),
            other => panic!("{} is not a matrix", other.name()),
        }
    }

    pub fn matrix_cell(&self, matrix: LayoutId, row: usize, column: usize) -> LayoutId {
        let (_, columns) = self.matrix_dimensions(matrix);
        self.child(matrix, row * columns + column)
    }

    /// Whether the last row and last column are made of grey cells.
    pub fn has_grey_squares(&self, matrix: LayoutId) -> bool {
        let (rows, columns) = self.matrix_dimensions(matrix);
        if rows < 2 || columns < 2 {
            return false;
        }
        let last_row = (0..columns).all(|j| self.is_grey_slot(self.matrix_cell(matrix, rows - 1, j)));
        let last_column = (0..rows).all(|i| self.is_grey_slot(self.matrix_cell(matrix, i, columns - 1)));
        last_row && last_column
    }

    /// Dimensions without the grey decoration row and column.
    pub fn real_dimensions(&self, matrix: LayoutId) -> (usize, usize) {
        let (rows, columns) = self.matrix_dimensions(matrix);
        if self.has_grey_squares(matrix) {
            (rows - 1, columns - 1)
        } else {
            (rows, columns)
        }
    }

    //___________________________________SERIALIZATION____________________________________

    /// Text the expression parser reads back.
    pub fn serialize(&self, id: LayoutId) -> String {
        match self.kind(id) {
            LayoutKind::Horizontal(_) => self.serialize_run(self.children(id)),
            LayoutKind::Matrix(_) => {
                let (rows, columns) = self.real_dimensions(id);
                let cells: Vec<String> = (0..rows)
                    .flat_map(|i| (0..columns).map(move |j| (i, j)))
                    .map(|(i, j)| self.serialize(self.matrix_cell(id, i, j)))
                    .collect();
                MatrixLayout { rows, columns }.serialize(&cells)
            }
            kind => {
                let children: Vec<String> =
                    self.children(id).iter().map(|c| self.serialize(*c)).collect();
                kind.serialize(&children)
            }
        }
    }

    /// A subscript followed by a parenthesised group is a logarithm base: `log_b(x)` becomes
    /// `log(x,b)`.
    fn serialize_run(&self, children: &[LayoutId]) -> String {
        let mut text = String::new();
        let mut i = 0;
        while i < children.len() {
            let child = children[i];
            if let LayoutKind::VerticalOffset(offset) = self.kind(child) {
                if offset.position == VerticalPosition::Subscript {
                    if let Some(close) = self.matching_right_parenthesis(children, i + 1) {
                        let base = self.serialize(self.child(child, 0));
                        let argument = self.serialize_run(&children[i + 2..close]);
                        text.push_str(&format!("({},{})", argument, base));
                        i = close + 1;
                        continue;
                    }
                }
            }
            text.push_str(&self.serialize(child));
            i += 1;
        }
        text
    }

    fn matching_right_parenthesis(&self, children: &[LayoutId], open: usize) -> Option<usize> {
        if open >= children.len() || !self.kind(children[open]).is_left_parenthesis() {
            return None;
        }
        let mut depth = 0usize;
        for (offset, child) in children[open + 1..].iter().enumerate() {
            let kind = self.kind(*child);
            if kind.is_left_parenthesis() {
                depth += 1;
            } else if kind.is_right_parenthesis() {
                if depth == 0 {
                    return Some(open + 1 + offset);
                }
                depth -= 1;
            }
        }
        None
    }

    pub fn to_text(&self) -> String {
        self.serialize(self.root)
    }

    pub fn write_text_in_buffer(&self, buffer: &mut [u8]) -> usize {
        write_text_in_buffer(&self.to_text(), buffer)
    }

    //___________________________________COMPARISON____________________________________

    /// Structural equality of two subtrees, possibly from different arenas.
    pub fn subtree_eq(&self, id: LayoutId, other: &LayoutTree, other_id: LayoutId) -> bool {
        if self.kind(id) != other.kind(other_id) {
            return false;
        }
        let (a, b) = (self.children(id), other.children(other_id));
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(x, y)| self.subtree_eq(*x, other, *y))
    }

    //___________________________________DEBUG OUTPUT____________________________________

    /// Table of every attached node with its geometry.
    pub fn dump_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["id", "depth", "kind", "parent", "x", "y", "w", "h", "baseline"]);
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let rect = self.rect(id);
            let parent = self
                .parent(id)
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            builder.push_record([
                id.to_string(),
                depth.to_string(),
                self.kind(id).name().to_string(),
                parent,
                rect.x.to_string(),
                rect.y.to_string(),
                rect.width.to_string(),
                rect.height.to_string(),
                self.baseline(id).to_string(),
            ]);
            for child in self.children(id).iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }

    pub fn log_dump(&self) {
        debug!(
            "layout tree '{}' ({} nodes)\n{}",
            self.to_text(),
            self.number_of_layouts(),
            self.dump_table()
        );
    }
}

/// Structural equality of the attached trees; arena slots and caches are ignored.
impl PartialEq for LayoutTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}
