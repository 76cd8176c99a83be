//! Interactive editing field: turns input events into cursor moves and layout edits.
/// input events, event status and the outcome reported to the owner
pub mod events;
/// the field itself
pub mod expression_layout_field;
/// viewport scrolled to the cursor
pub mod scrollable_view;
/// clipboard read by the Paste event
pub mod clipboard;
/// texts bound to layout skeletons
pub mod triggers;
