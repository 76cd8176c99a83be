//! Cursor inside a layout tree and its movement.
//!
//! A cursor points at a node and a side of it. Internally every position is converted to
//! a slot `(run, index)`: the gap before child `index` of a horizontal run. A cursor built
//! from a slot is canonical: right of the child before the gap, or left of the run when the
//! gap is the first one.

use crate::layout::layout_engine::{LayoutId, LayoutTree};
use crate::layout::layout_geometry::{KDCoordinate, KDRect};
use crate::layout::layout_shapes::{LayoutKind, NthRootLayout, VerticalPosition};

pub const CURSOR_WIDTH: KDCoordinate = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorPosition {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutCursor {
    pointed: Option<LayoutId>,
    position: CursorPosition,
}

impl LayoutCursor {
    pub fn new(pointed: LayoutId, position: CursorPosition) -> Self {
        LayoutCursor {
            pointed: Some(pointed),
            position,
        }
    }

    /// Result of a movement that found no target.
    pub fn undefined() -> Self {
        LayoutCursor {
            pointed: None,
            position: CursorPosition::Right,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.pointed.is_some()
    }

    pub fn pointed(&self) -> LayoutId {
        match self.pointed {
            Some(id) => id,
            None => panic!("reading the layout of an undefined cursor"),
        }
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    pub fn left_of_root(tree: &LayoutTree) -> Self {
        LayoutCursor::new(tree.root(), CursorPosition::Left)
    }

    pub fn right_of_root(tree: &LayoutTree) -> Self {
        LayoutCursor::at_slot(tree, tree.root(), tree.number_of_children(tree.root()))
    }

    /// Canonical cursor for the gap before child `index` of run `horizontal`.
    pub fn at_slot(tree: &LayoutTree, horizontal: LayoutId, index: usize) -> Self {
        if index == 0 || tree.is_empty_slot(horizontal) {
            LayoutCursor::new(horizontal, CursorPosition::Left)
        } else {
            LayoutCursor::new(tree.child(horizontal, index - 1), CursorPosition::Right)
        }
    }

    pub fn start_of(tree: &LayoutTree, horizontal: LayoutId) -> Self {
        LayoutCursor::at_slot(tree, horizontal, 0)
    }

    pub fn end_of(tree: &LayoutTree, horizontal: LayoutId) -> Self {
        LayoutCursor::at_slot(tree, horizontal, tree.number_of_children(horizontal))
    }

    /// Cursor left of a compound, in the run holding it.
    pub fn left_of(tree: &LayoutTree, id: LayoutId) -> Self {
        match (tree.parent(id), tree.index_in_parent(id)) {
            (Some(parent), Some(index)) => LayoutCursor::at_slot(tree, parent, index),
            _ => LayoutCursor::new(id, CursorPosition::Left),
        }
    }

    pub fn right_of(tree: &LayoutTree, id: LayoutId) -> Self {
        match (tree.parent(id), tree.index_in_parent(id)) {
            (Some(parent), Some(index)) => LayoutCursor::at_slot(tree, parent, index + 1),
            _ => LayoutCursor::new(id, CursorPosition::Right),
        }
    }

    /// The gap this cursor designates; a placeholder-only run has a single gap.
    pub fn slot(&self, tree: &LayoutTree) -> (LayoutId, usize) {
        let pointed = self.pointed();
        let (horizontal, index) = if tree.is_horizontal(pointed) {
            match self.position {
                CursorPosition::Left => (pointed, 0),
                CursorPosition::Right => (pointed, tree.number_of_children(pointed)),
            }
        } else {
            let parent = match tree.parent(pointed) {
                Some(parent) => parent,
                None => panic!("cursor points at the detached layout {}", pointed),
            };
            let index = tree.index_in_parent(pointed).unwrap_or(0);
            match self.position {
                CursorPosition::Left => (parent, index),
                CursorPosition::Right => (parent, index + 1),
            }
        };
        if tree.is_empty_slot(horizontal) {
            (horizontal, 0)
        } else {
            (horizontal, index)
        }
    }

    pub fn canonical(&self, tree: &LayoutTree) -> Self {
        let (horizontal, index) = self.slot(tree);
        LayoutCursor::at_slot(tree, horizontal, index)
    }

    //___________________________________GEOMETRY____________________________________

    /// Node whose edge the cursor is drawn on.
    fn anchor(&self, tree: &LayoutTree) -> (LayoutId, bool) {
        let (horizontal, index) = self.slot(tree);
        let children = tree.children(horizontal);
        if index > 0 {
            (children[index - 1], true)
        } else if let Some(first) = children.first() {
            (*first, false)
        } else {
            (horizontal, false)
        }
    }

    /// Rectangle of the cursor bar in root coordinates.
    pub fn cursor_rect(&self, tree: &LayoutTree) -> KDRect {
        let (anchor, right_edge) = self.anchor(tree);
        let rect = tree.rect(anchor);
        let x = if right_edge { rect.right() } else { rect.left() };
        KDRect::new(x, rect.y, CURSOR_WIDTH, rect.height)
    }

    /// Baseline of the cursor bar, measured from its top.
    pub fn baseline(&self, tree: &LayoutTree) -> KDCoordinate {
        let (anchor, _) = self.anchor(tree);
        tree.baseline(anchor)
    }

    //___________________________________MOVEMENT____________________________________

    /// Cursor after one move; `undefined()` when the move leaves the tree.
    pub fn cursor_moved(&self, tree: &LayoutTree, direction: Direction) -> LayoutCursor {
        match direction {
            Direction::Left => self.moved_left(tree),
            Direction::Right => self.moved_right(tree),
            Direction::Up => self.moved_vertically(tree, true),
            Direction::Down => self.moved_vertically(tree, false),
        }
    }

    fn moved_left(&self, tree: &LayoutTree) -> LayoutCursor {
        let (horizontal, index) = self.slot(tree);
        if index > 0 {
            let previous = tree.child(horizontal, index - 1);
            if tree.kind(previous).is_leaf() {
                return LayoutCursor::at_slot(tree, horizontal, index - 1);
            }
            return enter_from_right(tree, previous);
        }
        let Some(compound) = tree.parent(horizontal) else {
            return LayoutCursor::undefined();
        };
        let slot_index = tree.index_in_parent(horizontal).unwrap_or(0);
        match tree.kind(compound) {
            LayoutKind::NthRoot(NthRootLayout { has_index: true }) if slot_index == 0 => {
                LayoutCursor::end_of(tree, tree.child(compound, 1))
            }
            LayoutKind::Matrix(_) if slot_index % tree.matrix_dimensions(compound).1 > 0 => {
                LayoutCursor::end_of(tree, tree.child(compound, slot_index - 1))
            }
            _ => LayoutCursor::left_of(tree, compound),
        }
    }

    fn moved_right(&self, tree: &LayoutTree) -> LayoutCursor {
        let (horizontal, index) = self.slot(tree);
        let length = if tree.is_empty_slot(horizontal) {
            0
        } else {
            tree.number_of_children(horizontal)
        };
        if index < length {
            let next = tree.child(horizontal, index);
            if tree.kind(next).is_leaf() {
                return LayoutCursor::at_slot(tree, horizontal, index + 1);
            }
            return enter_from_left(tree, next);
        }
        let Some(compound) = tree.parent(horizontal) else {
            return LayoutCursor::undefined();
        };
        let slot_index = tree.index_in_parent(horizontal).unwrap_or(0);
        match tree.kind(compound) {
            LayoutKind::NthRoot(NthRootLayout { has_index: true }) if slot_index == 1 => {
                LayoutCursor::start_of(tree, tree.child(compound, 0))
            }
            LayoutKind::Matrix(_) => {
                let columns = tree.matrix_dimensions(compound).1;
                if slot_index % columns + 1 < columns {
                    LayoutCursor::start_of(tree, tree.child(compound, slot_index + 1))
                } else {
                    LayoutCursor::right_of(tree, compound)
                }
            }
            _ => LayoutCursor::right_of(tree, compound),
        }
    }

    fn moved_vertically(&self, tree: &LayoutTree, up: bool) -> LayoutCursor {
        let (horizontal, index) = self.slot(tree);
        let wanted = if up {
            VerticalPosition::Superscript
        } else {
            VerticalPosition::Subscript
        };
        let is_wanted_offset = |id: LayoutId| {
            matches!(tree.kind(id), LayoutKind::VerticalOffset(v) if v.position == wanted)
        };
        let children = tree.children(horizontal);
        if index > 0 && is_wanted_offset(children[index - 1]) {
            return LayoutCursor::end_of(tree, tree.child(children[index - 1], 0));
        }
        if index < children.len() && is_wanted_offset(children[index]) {
            return LayoutCursor::start_of(tree, tree.child(children[index], 0));
        }

        let x = self.cursor_rect(tree).x;
        let mut current = horizontal;
        while let Some(compound) = tree.parent(current) {
            let slot_index = tree.index_in_parent(current).unwrap_or(0);
            let target = match tree.kind(compound) {
                LayoutKind::Fraction(_) if up && slot_index == 1 => Some(tree.child(compound, 0)),
                LayoutKind::Fraction(_) if !up && slot_index == 0 => Some(tree.child(compound, 1)),
                LayoutKind::Matrix(_) => {
                    let (rows, columns) = tree.matrix_dimensions(compound);
                    let row = slot_index / columns;
                    if up && row > 0 {
                        Some(tree.child(compound, slot_index - columns))
                    } else if !up && row + 1 < rows {
                        Some(tree.child(compound, slot_index + columns))
                    } else {
                        None
                    }
                }
                LayoutKind::NthRoot(NthRootLayout { has_index: true }) => {
                    if up && slot_index == 0 {
                        Some(tree.child(compound, 1))
                    } else if !up && slot_index == 1 {
                        Some(tree.child(compound, 0))
                    } else {
                        None
                    }
                }
                LayoutKind::VerticalOffset(offset) => {
                    let leaving = match offset.position {
                        VerticalPosition::Superscript => !up,
                        VerticalPosition::Subscript => up,
                    };
                    if leaving {
                        return LayoutCursor::right_of(tree, compound);
                    }
                    None
                }
                _ => None,
            };
            if let Some(target) = target {
                return nearest_in_run(tree, target, x);
            }
            match tree.parent(compound) {
                Some(run) => current = run,
                None => break,
            }
        }
        LayoutCursor::undefined()
    }
}

/// Gap of `horizontal` whose x is closest to `x`.
fn nearest_in_run(tree: &LayoutTree, horizontal: LayoutId, x: KDCoordinate) -> LayoutCursor {
    if tree.is_empty_slot(horizontal) {
        return LayoutCursor::start_of(tree, horizontal);
    }
    let mut gap_x = tree.absolute_origin(horizontal).x;
    let mut best = (0, (gap_x - x).abs());
    for (index, child) in tree.children(horizontal).iter().enumerate() {
        gap_x += tree.size(*child).width;
        let distance = (gap_x - x).abs();
        if distance < best.1 {
            best = (index + 1, distance);
        }
    }
    LayoutCursor::at_slot(tree, horizontal, best.0)
}

/// First position inside a compound reached from its left.
pub fn enter_from_left(tree: &LayoutTree, compound: LayoutId) -> LayoutCursor {
    match tree.kind(compound) {
        LayoutKind::NthRoot(NthRootLayout { has_index: true }) => {
            LayoutCursor::start_of(tree, tree.child(compound, 1))
        }
        _ => LayoutCursor::start_of(tree, tree.child(compound, 0)),
    }
}

/// Last position inside a compound reached from its right.
pub fn enter_from_right(tree: &LayoutTree, compound: LayoutId) -> LayoutCursor {
    match tree.kind(compound) {
        LayoutKind::Fraction(_) => LayoutCursor::end_of(tree, tree.child(compound, 1)),
        LayoutKind::Matrix(_) => {
            let (rows, columns) = tree.real_dimensions(compound);
            LayoutCursor::end_of(tree, tree.matrix_cell(compound, rows - 1, columns - 1))
        }
        _ => LayoutCursor::end_of(tree, tree.child(compound, 0)),
    }
}
