//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;

use todos_api::v1::{TodoId, TodoItem, UserId};
use todos_back::{
    store::{FileStore, TodoTable},
    users::{UserFile, UserRecord},
    AppState,
};

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);
pub const CAROL: UserId = UserId(3);

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub store: Arc<FileStore>,
    pub state: Arc<AppState>,
}

pub fn users() -> UserFile {
    UserFile::from_records(vec![
        UserRecord::new(ALICE, "Alice", "alice", "wonderland"),
        UserRecord::new(BOB, "Bob", "bob", "hunter2"),
        UserRecord::new(CAROL, "Carol", "carol", "secret"),
    ])
    .unwrap()
}

pub fn todo(id: u64, owner: UserId, description: &str, completed: bool) -> TodoItem {
    TodoItem {
        id: TodoId(id),
        owner_id: owner,
        description: String::from(description),
        completed,
    }
}

/// State over a store seeded with `todos`.
pub fn fixture(todos: Vec<TodoItem>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::with_table(
        dir.path().join("data.ron"),
        TodoTable::from_items(todos),
    ));
    let state = Arc::new(AppState::new(store.clone(), Arc::new(users())));

    Fixture { dir, store, state }
}

/// Todo 42 belongs to Alice, todo 43 to Bob.
pub fn seeded() -> Fixture {
    fixture(vec![
        todo(42, ALICE, "Buy milk", false),
        todo(43, BOB, "Walk dog", true),
    ])
}
