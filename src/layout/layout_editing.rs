//! # Editing at the cursor
//!
//! ## Purpose
//! Structural edits driven by a `LayoutCursor`: inserting layouts (with merge of horizontal
//! runs), literal text, the shortcut skeletons bound to trigger texts, backspace and clear.
//!
//! ## Interesting Code Features
//! - every insertion goes through `LayoutTree::insert_in_horizontal`, which flattens runs and
//!   replaces a lone placeholder, so the tree invariants hold after each call
//! - the cursor is redirected to a gap of a live run before anything is freed
//! - backspace dissolves compounds one level following a fixed table per shape
//!
//! Shortcut skeletons:
//! - fraction: collapses the run left of the cursor into the numerator
//! - `e^□`, `^□`, `^2`, `√□`, `×10^□`
//! - 2x2 matrix with its grey squares

use crate::layout::layout_cursor::{LayoutCursor, enter_from_right};
use crate::layout::layout_engine::{LayoutId, LayoutTree};
use crate::layout::layout_shapes::{
    FractionLayout, HorizontalLayout, LayoutKind, LayoutShape, MatrixLayout, NthRootLayout,
    VerticalOffsetLayout, VerticalPosition,
};
use crate::layout::matrix_decorations::promote_grey_cell;
use log::{debug, trace};

/// Characters that stop the fraction shortcut from collapsing siblings into the numerator.
const FRACTION_STOPPERS: [char; 5] = ['+', '-', '−', '=', ','];

/// What a backspace did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackspaceEffect {
    /// something was removed or a compound was dissolved
    Deleted,
    /// the cursor moved into or out of a compound, the tree is unchanged
    Moved,
    Nothing,
}

/// Where the cursor goes after a compound is inserted: for a fraction its first empty slot,
/// otherwise right of the layout.
pub fn layout_to_point_when_inserting(tree: &LayoutTree, layout: LayoutId) -> LayoutCursor {
    if let LayoutKind::Fraction(_) = tree.kind(layout) {
        for slot in [tree.child(layout, 0), tree.child(layout, 1)] {
            if tree.is_empty_slot(slot) {
                return LayoutCursor::start_of(tree, slot);
            }
        }
    }
    LayoutCursor::right_of(tree, layout)
}

fn superscript(tree: &mut LayoutTree, contents: Vec<LayoutId>) -> (LayoutId, LayoutId) {
    let slot = tree.slot(contents);
    let offset = tree.add_node(
        LayoutKind::VerticalOffset(VerticalOffsetLayout {
            position: VerticalPosition::Superscript,
        }),
        vec![slot],
    );
    (offset, slot)
}

fn run(tree: &mut LayoutTree, items: Vec<LayoutId>) -> LayoutId {
    tree.add_node(LayoutKind::Horizontal(HorizontalLayout), items)
}

fn chars(tree: &mut LayoutTree, text: &str) -> Vec<LayoutId> {
    text.chars().map(|c| tree.add_leaf(LayoutKind::char(c))).collect()
}

impl LayoutCursor {
    //___________________________________INSERTION____________________________________

    /// Gap where new content goes, after promoting a grey matrix cell if the cursor is in one.
    fn insertion_slot(&self, tree: &mut LayoutTree) -> (LayoutId, usize) {
        let (horizontal, index) = self.slot(tree);
        if promote_grey_cell(tree, horizontal) {
            (horizontal, 0)
        } else {
            (horizontal, index)
        }
    }

    /// Inserts the detached `layout` at the cursor and moves right of what was inserted. A
    /// horizontal run is spliced into the surrounding run.
    pub fn add_layout_and_move_cursor(&mut self, tree: &mut LayoutTree, layout: LayoutId) {
        let (horizontal, index) = self.insertion_slot(tree);
        let inserted = tree.insert_in_horizontal(horizontal, index, layout);
        *self = LayoutCursor::at_slot(tree, horizontal, inserted.end);
    }

    /// Inserts `layout` and places the cursor: right of `pointed` when given, inside the first
    /// empty slot of an inserted compound, or right of the inserted content when
    /// `force_cursor_right` is set.
    pub fn insert_layout(
        &mut self,
        tree: &mut LayoutTree,
        layout: LayoutId,
        pointed: Option<LayoutId>,
        force_cursor_right: bool,
    ) {
        let merged = tree.is_horizontal(layout);
        trace!(
            "inserting {} at cursor (merged: {})",
            tree.kind(layout).name(),
            merged
        );
        self.add_layout_and_move_cursor(tree, layout);
        if !force_cursor_right {
            match pointed {
                Some(pointed) if pointed != layout || !merged => {
                    *self = LayoutCursor::right_of(tree, pointed);
                }
                _ if !merged => *self = layout_to_point_when_inserting(tree, layout),
                _ => {}
            }
        } else if !merged {
            *self = LayoutCursor::right_of(tree, layout);
        }
    }

    /// Inserts `text` as one glyph per character; the cursor lands inside the first `()`.
    pub fn insert_text(&mut self, tree: &mut LayoutTree, text: &str) {
        if text.is_empty() {
            return;
        }
        let leaves = chars(tree, text);
        let literal = run(tree, leaves);
        let (horizontal, index) = self.insertion_slot(tree);
        let inserted = tree.insert_in_horizontal(horizontal, index, literal);
        let children = tree.children(horizontal);
        let inside_parentheses = inserted.clone().find(|i| {
            i + 1 < inserted.end
                && tree.kind(children[*i]).is_left_parenthesis()
                && tree.kind(children[*i + 1]).is_right_parenthesis()
        });
        *self = match inside_parentheses {
            Some(i) => LayoutCursor::at_slot(tree, horizontal, i + 1),
            None => LayoutCursor::at_slot(tree, horizontal, inserted.end),
        };
    }

    //___________________________________SKELETONS____________________________________

    /// Fraction whose numerator takes the siblings left of the cursor, back to the first
    /// operator or unmatched parenthesis.
    pub fn add_fraction_layout_and_collapse_siblings(&mut self, tree: &mut LayoutTree) {
        let (horizontal, index) = self.insertion_slot(tree);
        let start = if tree.is_empty_slot(horizontal) {
            index
        } else {
            collapse_start(tree, horizontal, index)
        };
        let numerator_content: Vec<LayoutId> = (start..index)
            .map(|_| tree.remove_child(horizontal, start))
            .collect();
        debug!("fraction shortcut collapses {} siblings", numerator_content.len());
        let numerator = tree.slot(numerator_content);
        let denominator = tree.empty_slot();
        let fraction = tree.add_node(
            LayoutKind::Fraction(FractionLayout),
            vec![numerator, denominator],
        );
        tree.insert_in_horizontal(horizontal, start, fraction);
        *self = if tree.is_empty_slot(numerator) {
            LayoutCursor::start_of(tree, numerator)
        } else {
            LayoutCursor::start_of(tree, denominator)
        };
    }

    /// `e` followed by an empty superscript.
    pub fn add_empty_exponential_layout(&mut self, tree: &mut LayoutTree) {
        let e = tree.add_leaf(LayoutKind::char('e'));
        let (offset, slot) = superscript(tree, Vec::new());
        let layout = run(tree, vec![e, offset]);
        self.add_layout_and_move_cursor(tree, layout);
        *self = LayoutCursor::start_of(tree, slot);
    }

    pub fn add_empty_power_layout(&mut self, tree: &mut LayoutTree) {
        let (offset, slot) = superscript(tree, Vec::new());
        self.add_layout_and_move_cursor(tree, offset);
        *self = LayoutCursor::start_of(tree, slot);
    }

    /// Superscript `2`; the cursor stays right of it.
    pub fn add_empty_square_power_layout(&mut self, tree: &mut LayoutTree) {
        let two = tree.add_leaf(LayoutKind::char('2'));
        let (offset, _) = superscript(tree, vec![two]);
        self.add_layout_and_move_cursor(tree, offset);
    }

    pub fn add_empty_square_root_layout(&mut self, tree: &mut LayoutTree) {
        let radicand = tree.empty_slot();
        let root = tree.add_node(
            LayoutKind::NthRoot(NthRootLayout { has_index: false }),
            vec![radicand],
        );
        self.add_layout_and_move_cursor(tree, root);
        *self = LayoutCursor::start_of(tree, radicand);
    }

    /// `×10` followed by an empty superscript.
    pub fn add_empty_ten_power_layout(&mut self, tree: &mut LayoutTree) {
        let mut items = chars(tree, "×10");
        let (offset, slot) = superscript(tree, Vec::new());
        items.push(offset);
        let layout = run(tree, items);
        self.add_layout_and_move_cursor(tree, layout);
        *self = LayoutCursor::start_of(tree, slot);
    }

    /// One real cell and its grey row and column; the cursor goes in the real cell.
    pub fn add_empty_matrix_layout(&mut self, tree: &mut LayoutTree) {
        let first = tree.empty_slot();
        let mut cells = vec![first];
        for _ in 0..3 {
            cells.push(tree.grey_slot());
        }
        let matrix = tree.add_node(
            LayoutKind::Matrix(MatrixLayout {
                rows: 2,
                columns: 2,
            }),
            cells,
        );
        self.add_layout_and_move_cursor(tree, matrix);
        *self = LayoutCursor::start_of(tree, first);
    }

    //___________________________________DELETION____________________________________

    pub fn perform_backspace(&mut self, tree: &mut LayoutTree) -> BackspaceEffect {
        let (horizontal, index) = self.slot(tree);
        if index > 0 {
            let previous = tree.child(horizontal, index - 1);
            let kind = *tree.kind(previous);
            let removable = kind.is_leaf()
                || (matches!(kind, LayoutKind::VerticalOffset(_))
                    && tree.is_empty_slot(tree.child(previous, 0)));
            if removable {
                let removed = tree.remove_child(horizontal, index - 1);
                tree.free_subtree(removed);
                tree.refill_if_empty(horizontal);
                *self = LayoutCursor::at_slot(tree, horizontal, index - 1);
                return BackspaceEffect::Deleted;
            }
            *self = enter_from_right(tree, previous);
            return BackspaceEffect::Moved;
        }

        let Some(compound) = tree.parent(horizontal) else {
            return BackspaceEffect::Nothing;
        };
        let slot_index = tree.index_in_parent(horizontal).unwrap_or(0);
        let kind = *tree.kind(compound);
        match kind {
            LayoutKind::Fraction(_) => {
                let (numerator, denominator) = (tree.child(compound, 0), tree.child(compound, 1));
                if slot_index == 1 {
                    self.dissolve(tree, compound, &[numerator, denominator], 1)
                } else if tree.is_empty_slot(numerator) {
                    self.dissolve(tree, compound, &[denominator], 0)
                } else {
                    *self = LayoutCursor::left_of(tree, compound);
                    BackspaceEffect::Moved
                }
            }
            LayoutKind::NthRoot(_) if slot_index == 1 => {
                *self = LayoutCursor::left_of(tree, compound);
                BackspaceEffect::Moved
            }
            LayoutKind::NthRoot(_)
            | LayoutKind::VerticalOffset(_)
            | LayoutKind::Bracket(_)
            | LayoutKind::Conjugate(_) => self.dissolve(tree, compound, &[horizontal], 0),
            LayoutKind::Matrix(MatrixLayout { columns, .. }) => {
                let (row, column) = (slot_index / columns, slot_index % columns);
                if column > 0 {
                    *self = LayoutCursor::end_of(tree, tree.matrix_cell(compound, row, column - 1));
                    BackspaceEffect::Moved
                } else if row > 0 {
                    let (_, real_columns) = tree.real_dimensions(compound);
                    let previous = tree.matrix_cell(compound, row - 1, real_columns - 1);
                    *self = LayoutCursor::end_of(tree, previous);
                    BackspaceEffect::Moved
                } else if self.matrix_is_empty(tree, compound) {
                    self.delete_compound(tree, compound)
                } else {
                    *self = LayoutCursor::left_of(tree, compound);
                    BackspaceEffect::Moved
                }
            }
            _ => BackspaceEffect::Nothing,
        }
    }

    fn matrix_is_empty(&self, tree: &LayoutTree, matrix: LayoutId) -> bool {
        let (rows, columns) = tree.real_dimensions(matrix);
        (0..rows)
            .flat_map(|i| (0..columns).map(move |j| (i, j)))
            .all(|(i, j)| tree.is_empty_slot(tree.matrix_cell(matrix, i, j)))
    }

    fn delete_compound(&mut self, tree: &mut LayoutTree, compound: LayoutId) -> BackspaceEffect {
        let Some(parent) = tree.parent(compound) else {
            return BackspaceEffect::Nothing;
        };
        let position = tree.index_in_parent(compound).unwrap_or(0);
        let removed = tree.remove_child(parent, position);
        tree.free_subtree(removed);
        tree.refill_if_empty(parent);
        *self = LayoutCursor::at_slot(tree, parent, position);
        BackspaceEffect::Deleted
    }

    /// Replaces `compound` by the contents of `parts`, in order. The cursor ends after the
    /// content of the first `cursor_after_parts` parts.
    fn dissolve(
        &mut self,
        tree: &mut LayoutTree,
        compound: LayoutId,
        parts: &[LayoutId],
        cursor_after_parts: usize,
    ) -> BackspaceEffect {
        let Some(parent) = tree.parent(compound) else {
            return BackspaceEffect::Nothing;
        };
        let position = tree.index_in_parent(compound).unwrap_or(0);
        trace!("dissolving {} at {}", tree.kind(compound).name(), position);
        let mut contents = Vec::new();
        let mut junction = position;
        for (n, part) in parts.iter().enumerate() {
            for child in tree.take_children(*part) {
                if tree.kind(child).is_empty() {
                    tree.free_subtree(child);
                } else {
                    contents.push(child);
                }
            }
            if n + 1 == cursor_after_parts {
                junction = position + contents.len();
            }
        }
        let removed = tree.remove_child(parent, position);
        tree.free_subtree(removed);
        for (offset, child) in contents.into_iter().enumerate() {
            tree.insert_child(parent, position + offset, child);
        }
        tree.refill_if_empty(parent);
        *self = LayoutCursor::at_slot(tree, parent, junction);
        BackspaceEffect::Deleted
    }

    /// Empties the tree and puts the cursor at its start.
    pub fn clear_layout(&mut self, tree: &mut LayoutTree) {
        *tree = LayoutTree::new();
        *self = LayoutCursor::left_of_root(tree);
    }
}

/// Index of the first sibling the fraction shortcut pulls into its numerator.
fn collapse_start(tree: &LayoutTree, horizontal: LayoutId, index: usize) -> usize {
    let children = tree.children(horizontal);
    let mut depth = 0usize;
    let mut start = index;
    while start > 0 {
        let kind = tree.kind(children[start - 1]);
        if kind.is_right_parenthesis() {
            depth += 1;
        } else if kind.is_left_parenthesis() {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if depth == 0
            && matches!(kind, LayoutKind::Char(c) if FRACTION_STOPPERS.contains(&c.ch))
        {
            break;
        }
        start -= 1;
    }
    start
}
