//! Users joined with the todos they own.

use todos_api::v1::{TodoItem, UserAccount};

use crate::{
    store::{TodoFilter, TodoStore},
    users::UserDirectory,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserTodos {
    pub user: UserAccount,
    pub todos: Vec<TodoItem>,
}

impl UserTodos {
    pub async fn load(user: UserAccount, store: &dyn TodoStore) -> Self {
        let todos = store.find_all(TodoFilter::Owner(user.id)).await;
        Self { user, todos }
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    pub fn incomplete_count(&self) -> usize {
        self.todos.len() - self.completed_count()
    }
}

/// Resolves `slug` and eagerly loads that user's todos.
pub async fn find_by_slug(
    users: &dyn UserDirectory,
    store: &dyn TodoStore,
    slug: &str,
) -> Option<UserTodos> {
    let user = users.find_by_slug(slug)?;
    Some(UserTodos::load(user, store).await)
}

/// Every user owning at least one todo, ordered by their first todo.
///
/// Owners missing from the directory are skipped.
pub async fn contributors(users: &dyn UserDirectory, store: &dyn TodoStore) -> Vec<UserTodos> {
    let mut contributors = Vec::new();
    for owner in store.distinct_owners().await {
        let Some(user) = users.find_by_id(owner) else {
            continue;
        };
        contributors.push(UserTodos::load(user, store).await);
    }
    contributors
}
