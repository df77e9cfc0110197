//! Inline editing decisions, independent of the DOM.

use todos_api::v1::{element, EditorConfig, TodoId};

/// Key that confirms an inline edit.
pub const CONFIRM_KEY: &str = "Enter";

/// A confirmed inline edit.
///
/// The displayed text is always patched, the update is only sent when the
/// input carried a usable id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmed {
    pub id: Option<TodoId>,
    pub description: String,
}

pub fn confirm(key: &str, input_id: &str, value: &str) -> Option<Confirmed> {
    if key != CONFIRM_KEY {
        return None;
    }

    Some(Confirmed {
        id: element::parse_item_id(input_id),
        description: String::from(value),
    })
}

pub fn toggle_target(checkbox_id: &str) -> Option<TodoId> {
    element::parse_item_id(checkbox_id)
}

/// Absolute endpoint urls built from the page origin and `window.todoEdit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    origin: String,
    config: EditorConfig,
}

impl Endpoints {
    pub fn new(origin: impl Into<String>, config: EditorConfig) -> Self {
        let origin = origin.into().trim_end_matches('/').to_owned();
        Self { origin, config }
    }

    pub fn update_url(&self, id: TodoId) -> String {
        self.absolute(self.config.update_url_for(id))
    }

    pub fn toggle_url(&self, id: TodoId) -> String {
        self.absolute(self.config.toggle_url_for(id))
    }

    fn absolute(&self, url: String) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.origin, url)
        } else {
            url
        }
    }
}
