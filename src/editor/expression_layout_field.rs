//! # Expression layout field
//!
//! ## Purpose
//! Adapter between host input events and the layout cursor. It owns the edited layout tree,
//! the cursor and the viewport, processes one event to completion (mutate → invalidate →
//! recompute on read → scroll) and reports a `FieldResponse` instead of calling back into its
//! owner.
//!
//! ## Main Structures
//! - `ExpressionLayoutField`: editing state, layout ceiling, trigger table, viewport
//!
//! ## Interesting Code Features
//! - text events try the trigger table, then the parser, then fall back to literal glyphs
//! - a parsed layout is imported into the field's arena only after the ceiling check, so a
//!   rejected insertion leaves the tree untouched
//! - grey squares of matrices are recomputed from the cursor after every handled event

use crate::Utils::preferences::{DEFAULT_MAX_LAYOUTS, Preferences};
use crate::editor::clipboard::Clipboard;
use crate::editor::events::{Event, FieldOutcome, FieldResponse};
use crate::editor::scrollable_view::ScrollableView;
use crate::editor::triggers::{TriggerAction, TriggerTable};
use crate::layout::layout_cursor::{Direction, LayoutCursor};
use crate::layout::layout_editing::BackspaceEffect;
use crate::layout::layout_engine::{LayoutId, LayoutTree};
use crate::layout::layout_geometry::{KDCoordinate, KDPoint, KDRect, KDSize};
use crate::layout::layout_shapes::LayoutShape;
use crate::layout::matrix_decorations::apply_matrix_marking;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::print_float::{DEFAULT_SIGNIFICANT_DIGITS, DisplayMode};
use crate::symbolic::symbolic_engine::ExprType;
use log::{debug, info, warn};

/// Layouts kept free by the text-insertion check.
pub const TEXT_INSERTION_MARGIN: usize = 6;

pub struct ExpressionLayoutField {
    tree: LayoutTree,
    cursor: LayoutCursor,
    editing: bool,
    max_layouts: usize,
    display_mode: DisplayMode,
    significant_digits: usize,
    triggers: TriggerTable,
    finish_events: Vec<Event>,
    view: ScrollableView,
    last_height: KDCoordinate,
}

impl ExpressionLayoutField {
    pub fn new(viewport: KDSize) -> Self {
        let tree = LayoutTree::new();
        let cursor = LayoutCursor::left_of_root(&tree);
        let last_height = tree.minimal_size().height;
        let mut view = ScrollableView::new(viewport);
        view.set_content_size(tree.minimal_size());
        ExpressionLayoutField {
            tree,
            cursor,
            editing: false,
            max_layouts: DEFAULT_MAX_LAYOUTS,
            display_mode: DisplayMode::Decimal,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            triggers: TriggerTable::default(),
            finish_events: vec![Event::Ok, Event::Exe],
            view,
            last_height,
        }
    }

    pub fn from_preferences(preferences: &Preferences, viewport: KDSize) -> Self {
        let mut field = ExpressionLayoutField::new(viewport);
        field.max_layouts = preferences.max_layouts;
        field.display_mode = preferences.display_mode;
        field.significant_digits = preferences.significant_digits;
        field.triggers = preferences.triggers.clone();
        field
    }

    pub fn with_max_layouts(mut self, max_layouts: usize) -> Self {
        assert!(
            max_layouts > TEXT_INSERTION_MARGIN,
            "the layout ceiling must leave room for the insertion margin"
        );
        self.max_layouts = max_layouts;
        self
    }

    /// Events that end editing, `Ok` and `Exe` by default.
    pub fn set_finish_events(&mut self, events: Vec<Event>) {
        self.finish_events = events;
    }

    //___________________________________STATE____________________________________

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        if editing && !self.editing {
            self.cursor = LayoutCursor::right_of_root(&self.tree);
        }
        self.editing = editing;
        let cursor = self.editing_cursor();
        apply_matrix_marking(&mut self.tree, &cursor);
    }

    /// Cursor as seen by the matrix marking: nowhere when not editing.
    fn editing_cursor(&self) -> LayoutCursor {
        if self.editing {
            self.cursor
        } else {
            LayoutCursor::undefined()
        }
    }

    pub fn max_layouts(&self) -> usize {
        self.max_layouts
    }

    /// Parseable text of the current layout.
    pub fn text(&self) -> String {
        self.tree.to_text()
    }

    pub fn write_text_in_buffer(&self, buffer: &mut [u8]) -> usize {
        self.tree.write_text_in_buffer(buffer)
    }

    pub fn minimal_size_for_optimal_display(&self) -> KDSize {
        self.tree.minimal_size()
    }

    pub fn scroll_offset(&self) -> KDPoint {
        self.view.offset()
    }

    pub fn visible_rect(&self) -> KDRect {
        self.view.visible_rect()
    }

    pub fn cursor_rect(&self) -> KDRect {
        self.cursor.cursor_rect(&self.tree)
    }

    //___________________________________EVENTS____________________________________

    pub fn handle_event(&mut self, event: &Event, clipboard: &dyn Clipboard) -> FieldResponse {
        let outcome = match event {
            // a successful move also starts editing
            _ if event.is_move() => match event.direction().map(|d| self.handle_move(d)) {
                Some(FieldOutcome::MovedWithinTree) => {
                    self.editing = true;
                    FieldOutcome::MovedWithinTree
                }
                _ => FieldOutcome::Unhandled,
            },
            Event::ShiftLeft | Event::ShiftRight => {
                self.cursor = if *event == Event::ShiftLeft {
                    LayoutCursor::left_of_root(&self.tree)
                } else {
                    LayoutCursor::right_of_root(&self.tree)
                };
                self.editing = true;
                FieldOutcome::MovedWithinTree
            }
            _ => self.private_handle_event(event, clipboard),
        };
        if outcome == FieldOutcome::Unhandled {
            debug!("event {:?} not handled by the field", event);
            return FieldResponse::unhandled();
        }
        let cursor = self.editing_cursor();
        apply_matrix_marking(&mut self.tree, &cursor);
        let size_changed = self.reload();
        debug!(
            "event {:?} -> {:?} (text '{}', {} layouts)",
            event,
            outcome,
            self.text(),
            self.tree.number_of_layouts()
        );
        FieldResponse::new(outcome, size_changed)
    }

    fn handle_move(&mut self, direction: Direction) -> FieldOutcome {
        let moved = self.cursor.cursor_moved(&self.tree, direction);
        if !moved.is_defined() {
            return FieldOutcome::Unhandled;
        }
        self.cursor = moved;
        FieldOutcome::MovedWithinTree
    }

    fn private_handle_event(&mut self, event: &Event, clipboard: &dyn Clipboard) -> FieldOutcome {
        if self.editing && self.finish_events.contains(event) {
            let text = self.text();
            info!("editing finished with '{}'", text);
            self.editing = false;
            self.clear_layout();
            return FieldOutcome::FinishedEditing(text);
        }
        match event {
            Event::Ok | Event::Exe if !self.editing => {
                self.set_editing(true);
                FieldOutcome::StartedEditing
            }
            Event::Back if self.editing => {
                self.clear_layout();
                self.editing = false;
                FieldOutcome::AbortedEditing
            }
            Event::Text(text) => {
                self.start_editing_if_needed();
                self.handle_event_with_text(text, false)
            }
            Event::Paste => {
                self.start_editing_if_needed();
                let text = clipboard.stored_text().to_string();
                self.handle_event_with_text(&text, true)
            }
            Event::Backspace => {
                self.start_editing_if_needed();
                match self.cursor.perform_backspace(&mut self.tree) {
                    BackspaceEffect::Deleted => FieldOutcome::Deleted,
                    BackspaceEffect::Moved => FieldOutcome::MovedWithinTree,
                    BackspaceEffect::Nothing => FieldOutcome::NoChange,
                }
            }
            Event::Clear if self.editing => {
                self.clear_layout();
                FieldOutcome::Cleared
            }
            Event::Toolbox => {
                self.start_editing_if_needed();
                FieldOutcome::ToolboxRequested
            }
            _ => FieldOutcome::Unhandled,
        }
    }

    fn start_editing_if_needed(&mut self) {
        if !self.editing {
            self.set_editing(true);
        }
    }

    fn clear_layout(&mut self) {
        self.cursor.clear_layout(&mut self.tree);
    }

    /// Inserts `text` at the cursor: a trigger skeleton, the layout of the parsed expression,
    /// or the literal glyphs when the text does not parse.
    pub fn handle_event_with_text(&mut self, text: &str, force_cursor_right: bool) -> FieldOutcome {
        if text.is_empty() {
            return FieldOutcome::NoChange;
        }
        let current = self.tree.number_of_layouts();
        if current >= self.max_layouts - TEXT_INSERTION_MARGIN {
            warn!(
                "text '{}' rejected: {} layouts, ceiling {}",
                text, current, self.max_layouts
            );
            return FieldOutcome::Rejected;
        }

        if let Some(action) = self.triggers.action_for(text) {
            self.insert_skeleton(action);
            return FieldOutcome::Inserted;
        }

        let expression = match parse_expression(text) {
            Ok(expression) => expression,
            Err(err) => {
                let glyphs = text.chars().count();
                if current + glyphs >= self.max_layouts {
                    warn!(
                        "text '{}' rejected: {} + {} layouts, ceiling {}",
                        text, current, glyphs, self.max_layouts
                    );
                    return FieldOutcome::Rejected;
                }
                debug!("'{}' inserted as text: {}", text, err);
                self.cursor.insert_text(&mut self.tree, text);
                return FieldOutcome::Inserted;
            }
        };
        let created = expression.create_layout(self.display_mode, self.significant_digits);
        let created_count = created.number_of_descendants(created.root(), true);
        if current + created_count >= self.max_layouts {
            warn!(
                "layout of '{}' rejected: {} + {} layouts, ceiling {}",
                text, current, created_count, self.max_layouts
            );
            return FieldOutcome::Rejected;
        }

        let source = single_compound_child(&created).unwrap_or(created.root());
        let layout = self.tree.import_subtree(&created, source);
        let pointed = if expression.ty() == ExprType::Random {
            Some(layout)
        } else if self.tree.is_horizontal(layout) {
            self.tree
                .children(layout)
                .iter()
                .copied()
                .find(|child| self.tree.kind(*child).is_left_parenthesis())
        } else {
            None
        };
        self.cursor
            .insert_layout(&mut self.tree, layout, pointed, force_cursor_right);
        FieldOutcome::Inserted
    }

    fn insert_skeleton(&mut self, action: TriggerAction) {
        let tree = &mut self.tree;
        match action {
            TriggerAction::Division => self.cursor.add_fraction_layout_and_collapse_siblings(tree),
            TriggerAction::Exponential => self.cursor.add_empty_exponential_layout(tree),
            TriggerAction::Power => self.cursor.add_empty_power_layout(tree),
            TriggerAction::Square => self.cursor.add_empty_square_power_layout(tree),
            TriggerAction::SquareRoot => self.cursor.add_empty_square_root_layout(tree),
            TriggerAction::TenPower => self.cursor.add_empty_ten_power_layout(tree),
            TriggerAction::Matrix => self.cursor.add_empty_matrix_layout(tree),
        }
    }

    /// Replaces the content by the layout of `text` and keeps editing.
    pub fn set_text(&mut self, text: &str) -> FieldOutcome {
        self.clear_layout();
        self.start_editing_if_needed();
        let outcome = self.handle_event_with_text(text, true);
        let cursor = self.editing_cursor();
        apply_matrix_marking(&mut self.tree, &cursor);
        self.reload();
        outcome
    }

    //___________________________________GEOMETRY____________________________________

    /// Recomputes the content size and scrolls to the cursor. Returns whether the height of
    /// the layout changed.
    fn reload(&mut self) -> bool {
        let size = self.tree.minimal_size();
        let size_changed = size.height != self.last_height;
        self.last_height = size.height;
        self.view.set_content_size(size);
        self.scroll_to_cursor();
        size_changed
    }

    pub fn scroll_to_cursor(&mut self) {
        if !self.cursor.is_defined() {
            return;
        }
        let rect = self.cursor.cursor_rect(&self.tree);
        let baseline = self.cursor.baseline(&self.tree);
        self.view.scroll_to_baselined_rect(rect, baseline);
    }

    pub fn set_viewport(&mut self, viewport: KDSize) {
        self.view.set_viewport(viewport);
        self.scroll_to_cursor();
    }
}

/// The lone compound of a freshly built layout, inserted as is instead of merged.
fn single_compound_child(tree: &LayoutTree) -> Option<LayoutId> {
    match tree.children(tree.root()) {
        [only] if !tree.kind(*only).is_leaf() => Some(*only),
        _ => None,
    }
}
