//! Input events of the editing field and what handling them produced.

use crate::layout::layout_cursor::Direction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Left,
    Right,
    Up,
    Down,
    ShiftLeft,
    ShiftRight,
    Ok,
    Exe,
    Back,
    Clear,
    Backspace,
    Paste,
    Toolbox,
    Text(String),
}

impl Event {
    pub fn text(text: &str) -> Event {
        Event::Text(text.to_string())
    }

    /// Direction of a plain move event.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Event::Left => Some(Direction::Left),
            Event::Right => Some(Direction::Right),
            Event::Up => Some(Direction::Up),
            Event::Down => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn is_move(&self) -> bool {
        self.direction().is_some()
    }
}

/// Coarse result reported to the event dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    /// handled, tree or cursor changed and a redraw is due
    Changed,
    /// handled, nothing to redraw
    Unchanged,
    /// not for this field; the dispatcher may pass it on
    Unhandled,
}

/// What handling one event did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldOutcome {
    MovedWithinTree,
    Inserted,
    Deleted,
    Cleared,
    StartedEditing,
    /// carries the serialized text of the finished layout
    FinishedEditing(String),
    AbortedEditing,
    ToolboxRequested,
    /// the edit would exceed the layout ceiling; the tree is unchanged
    Rejected,
    NoChange,
    Unhandled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldResponse {
    pub outcome: FieldOutcome,
    /// the height of the layout changed, the owner may need to resize the field
    pub size_changed: bool,
}

impl FieldResponse {
    pub fn new(outcome: FieldOutcome, size_changed: bool) -> Self {
        FieldResponse {
            outcome,
            size_changed,
        }
    }

    pub fn unhandled() -> Self {
        FieldResponse::new(FieldOutcome::Unhandled, false)
    }

    pub fn status(&self) -> EventStatus {
        match self.outcome {
            FieldOutcome::Unhandled => EventStatus::Unhandled,
            FieldOutcome::NoChange | FieldOutcome::Rejected | FieldOutcome::ToolboxRequested => {
                EventStatus::Unchanged
            }
            _ => EventStatus::Changed,
        }
    }
}
