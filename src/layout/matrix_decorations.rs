//! Grey squares on matrices around the cursor.
//!
//! A matrix holding the cursor shows one extra row and one extra column of grey cells,
//! where typing grows the matrix. The decoration is never stored as a flag: the set of
//! marked matrices is a pure function of the tree and the cursor, and whether a matrix
//! currently carries grey squares is read from its cells.

use crate::layout::layout_cursor::LayoutCursor;
use crate::layout::layout_engine::{LayoutId, LayoutTree};
use crate::layout::layout_shapes::{EmptyColor, LayoutKind, MatrixLayout};
use log::trace;

/// Matrices that are ancestors of the cursor, innermost first.
pub fn matrix_ancestors(tree: &LayoutTree, cursor: &LayoutCursor) -> Vec<LayoutId> {
    if !cursor.is_defined() {
        return Vec::new();
    }
    let (horizontal, _) = cursor.slot(tree);
    tree.ancestors(horizontal)
        .into_iter()
        .filter(|id| tree.kind(*id).is_matrix())
        .collect()
}

/// Adds grey squares to the matrices holding the cursor and strips them everywhere else.
pub fn apply_matrix_marking(tree: &mut LayoutTree, cursor: &LayoutCursor) {
    let marked = matrix_ancestors(tree, cursor);
    let matrices: Vec<LayoutId> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|id| tree.kind(*id).is_matrix())
        .collect();
    for matrix in matrices {
        let has_grey_squares = tree.has_grey_squares(matrix);
        let wanted = marked.contains(&matrix);
        if wanted && !has_grey_squares {
            add_grey_squares(tree, matrix);
        } else if !wanted && has_grey_squares {
            remove_grey_squares(tree, matrix);
        }
    }
}

/// Removes every grey square in the tree.
pub fn remove_all_grey_squares(tree: &mut LayoutTree) {
    apply_matrix_marking(tree, &LayoutCursor::undefined());
}

fn rebuild(tree: &mut LayoutTree, matrix: LayoutId, rows: usize, columns: usize, cells: Vec<LayoutId>) {
    tree.set_kind(matrix, LayoutKind::Matrix(MatrixLayout { rows, columns }));
    for (index, cell) in cells.into_iter().enumerate() {
        tree.insert_child(matrix, index, cell);
    }
}

pub fn add_grey_squares(tree: &mut LayoutTree, matrix: LayoutId) {
    let (rows, columns) = tree.matrix_dimensions(matrix);
    trace!("adding grey squares to {}x{} matrix {}", rows, columns, matrix);
    let cells = tree.take_children(matrix);
    let mut grown = Vec::with_capacity((rows + 1) * (columns + 1));
    for row in cells.chunks(columns) {
        grown.extend_from_slice(row);
        grown.push(tree.grey_slot());
    }
    for _ in 0..=columns {
        grown.push(tree.grey_slot());
    }
    rebuild(tree, matrix, rows + 1, columns + 1, grown);
}

pub fn remove_grey_squares(tree: &mut LayoutTree, matrix: LayoutId) {
    let (rows, columns) = tree.matrix_dimensions(matrix);
    trace!("removing grey squares from {}x{} matrix {}", rows, columns, matrix);
    let cells = tree.take_children(matrix);
    let mut kept = Vec::with_capacity((rows - 1) * (columns - 1));
    for (index, cell) in cells.into_iter().enumerate() {
        if index / columns < rows - 1 && index % columns < columns - 1 {
            kept.push(cell);
        } else {
            tree.free_subtree(cell);
        }
    }
    rebuild(tree, matrix, rows - 1, columns - 1, kept);
}

/// Turns the grey row and/or column of `slot` into real cells before something is typed in
/// it, and grows a new grey row and/or column. Returns whether anything was promoted.
pub fn promote_grey_cell(tree: &mut LayoutTree, slot: LayoutId) -> bool {
    if !tree.is_grey_slot(slot) {
        return false;
    }
    let Some(matrix) = tree.parent(slot) else {
        return false;
    };
    if !tree.kind(matrix).is_matrix() || !tree.has_grey_squares(matrix) {
        return false;
    }
    let (rows, columns) = tree.matrix_dimensions(matrix);
    let index = tree.index_in_parent(slot).unwrap_or(0);
    let grow_row = index / columns == rows - 1;
    let grow_column = index % columns == columns - 1;

    for i in 0..rows {
        for j in 0..columns {
            let on_new_column = grow_column && j == columns - 1 && (i < rows - 1 || grow_row);
            let on_new_row = grow_row && i == rows - 1 && (j < columns - 1 || grow_column);
            if on_new_column || on_new_row {
                let cell = tree.matrix_cell(matrix, i, j);
                let leaf = tree.child(cell, 0);
                tree.set_kind(leaf, LayoutKind::empty(EmptyColor::Yellow, true));
            }
        }
    }

    let new_columns = columns + usize::from(grow_column);
    let new_rows = rows + usize::from(grow_row);
    let cells = tree.take_children(matrix);
    let mut grown = Vec::with_capacity(new_rows * new_columns);
    for row in cells.chunks(columns) {
        grown.extend_from_slice(row);
        if grow_column {
            grown.push(tree.grey_slot());
        }
    }
    if grow_row {
        for _ in 0..new_columns {
            grown.push(tree.grey_slot());
        }
    }
    rebuild(tree, matrix, new_rows, new_columns, grown);
    trace!(
        "promoted grey cell of matrix {} to {}x{}",
        matrix, new_rows, new_columns
    );
    true
}
