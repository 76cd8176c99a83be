//! Two-dimensional typeset layouts and the cursor that edits them.
/// integer points, sizes and rectangles, glyph metrics
pub mod layout_geometry;
/// per-shape geometry and text rules, dispatched with enum_dispatch
pub mod layout_shapes;
/// arena of layout nodes with cached geometry, serialization and debug tables
pub mod layout_engine;
/// cursor positions and Left/Right/Up/Down movement
pub mod layout_cursor;
/// insertion with merge, trigger skeletons, backspace and clear
pub mod layout_editing;
/// grey squares on matrices holding the cursor
pub mod matrix_decorations;
#[cfg(test)]
mod layout_tests;
