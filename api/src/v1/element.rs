//! Composite element ids used by the edit page, `todo_{id}_{field}`.
//!
//! The server writes them into the markup and the inline editor parses the
//! item id back out of them.

use super::TodoId;

pub const PREFIX: &str = "todo";
pub const DESCRIPTION: &str = "description";
pub const COMPLETED: &str = "completed";

pub fn element_id(id: TodoId, field: &str) -> String {
    format!("{PREFIX}_{id}_{field}")
}

pub fn description_input(id: TodoId) -> String {
    element_id(id, DESCRIPTION)
}

pub fn completed_checkbox(id: TodoId) -> String {
    element_id(id, COMPLETED)
}

/// Extracts the item id from the second `_`-separated segment.
pub fn parse_item_id(element_id: &str) -> Option<TodoId> {
    let mut parts = element_id.split('_');
    if parts.next()? != PREFIX {
        return None;
    }

    parts.next()?.parse().ok()
}
