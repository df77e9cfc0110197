pub mod element;
pub mod routes;

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

macro_rules! id_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

id_impls!(TodoId);
id_impls!(UserId);

/// A single row of the `todo_items` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub owner_id: UserId,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Public view of a user account. Accounts themselves are owned by the user
/// directory, todos only reference them through [`TodoItem::owner_id`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub display_name: String,
    pub slug: String,
}

/// Name of the `window` property holding the [`EditorConfig`].
pub const EDITOR_OBJECT: &str = "todoEdit";

/// Object handed to the inline editor through `window.todoEdit`.
///
/// Both urls are prefixes, the item id is appended to them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub update_url: String,
    pub toggle_url: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            update_url: String::from(routes::UPDATE_TODO_PREFIX),
            toggle_url: String::from(routes::TOGGLE_TODO_PREFIX),
        }
    }
}

impl EditorConfig {
    pub fn update_url_for(&self, id: TodoId) -> String {
        format!("{}{}", self.update_url, id)
    }

    pub fn toggle_url_for(&self, id: TodoId) -> String {
        format!("{}{}", self.toggle_url, id)
    }
}

/// Trims a submitted description, returning `None` when nothing is left.
pub fn normalize_description(description: &str) -> Option<&str> {
    let description = description.trim();
    (!description.is_empty()).then_some(description)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Buy milk", Some("Buy milk"))]
    #[case("  Buy oat milk \n", Some("Buy oat milk"))]
    #[case("", None)]
    #[case(" \t\n ", None)]
    fn normalizes_descriptions(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_description(input), expected);
    }

    #[test]
    fn editor_config_appends_ids() {
        let config = EditorConfig::default();

        assert_eq!(config.update_url_for(TodoId(42)), "/todo/update/42");
        assert_eq!(config.toggle_url_for(TodoId(7)), "/todo/toggle/7");
    }

    #[test]
    fn editor_config_uses_snake_case_keys() {
        let json = serde_json::to_string(&EditorConfig::default()).unwrap();

        assert_eq!(
            json,
            r#"{"update_url":"/todo/update/","toggle_url":"/todo/toggle/"}"#
        );
    }

    #[test]
    fn ids_are_transparent_integers() {
        let item = TodoItem {
            id: TodoId(3),
            owner_id: UserId(9),
            description: String::from("x"),
            completed: true,
        };
        let json = serde_json::to_string(&item).unwrap();

        assert_eq!(
            json,
            r#"{"id":3,"owner_id":9,"description":"x","completed":true}"#
        );
        assert_eq!("12".parse::<TodoId>().unwrap(), TodoId(12));
        assert!("abc".parse::<UserId>().is_err());
    }
}
