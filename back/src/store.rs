//! Todo persistence.
//!
//! The `todo_items` table lives in memory and is snapshotted to a RON file.
//! Every mutation bumps a generation counter so the snapshot is only written
//! when something actually changed.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todos_api::v1::{normalize_description, TodoId, TodoItem, UserId};
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("description is empty")]
    EmptyDescription,
    #[error("failed to access snapshot: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] ron::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TodoFilter {
    All,
    Owner(UserId),
}

impl TodoFilter {
    fn matches(self, todo: &TodoItem) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Owner(owner) => todo.owner_id == owner,
        }
    }
}

/// Point reads and writes over todo rows.
///
/// Ownership is never checked here, callers decide who may touch a row.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Rows matching `filter` in insertion order.
    async fn find_all(&self, filter: TodoFilter) -> Vec<TodoItem>;

    async fn find_by_id(&self, id: TodoId) -> Option<TodoItem>;

    /// Distinct owner ids, ordered by their first todo.
    async fn distinct_owners(&self) -> Vec<UserId>;

    async fn create(&self, owner: UserId, description: &str) -> Result<TodoItem, StoreError>;

    async fn update(&self, id: TodoId, description: &str) -> Result<TodoItem, StoreError>;

    async fn toggle_completed(&self, id: TodoId) -> Result<TodoItem, StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoTable {
    next_id: u64,
    todos: Vec<TodoItem>,
}

impl Default for TodoTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            todos: Vec::new(),
        }
    }
}

impl TodoTable {
    /// Builds a table from existing rows, continuing ids after the largest one.
    pub fn from_items(todos: Vec<TodoItem>) -> Self {
        let next_id = todos.iter().map(|todo| todo.id.0).max().unwrap_or(0) + 1;
        Self { next_id, todos }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn find_all(&self, filter: TodoFilter) -> Vec<TodoItem> {
        (self.todos.iter())
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect()
    }

    pub fn find_by_id(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn distinct_owners(&self) -> Vec<UserId> {
        let mut owners = Vec::new();
        for todo in &self.todos {
            if !owners.contains(&todo.owner_id) {
                owners.push(todo.owner_id);
            }
        }
        owners
    }

    pub fn create(&mut self, owner: UserId, description: &str) -> Result<TodoItem, StoreError> {
        let description = normalize_description(description).ok_or(StoreError::EmptyDescription)?;

        let todo = TodoItem {
            id: TodoId(self.next_id),
            owner_id: owner,
            description: String::from(description),
            completed: false,
        };
        self.next_id += 1;
        self.todos.push(todo.clone());

        Ok(todo)
    }

    pub fn update(&mut self, id: TodoId, description: &str) -> Result<TodoItem, StoreError> {
        let description = normalize_description(description).ok_or(StoreError::EmptyDescription)?;
        let todo = self.get_mut(id)?;
        todo.description = String::from(description);
        Ok(todo.clone())
    }

    pub fn toggle_completed(&mut self, id: TodoId) -> Result<TodoItem, StoreError> {
        let todo = self.get_mut(id)?;
        todo.completed = !todo.completed;
        Ok(todo.clone())
    }

    fn get_mut(&mut self, id: TodoId) -> Result<&mut TodoItem, StoreError> {
        (self.todos.iter_mut())
            .find(|todo| todo.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

/// [`TodoStore`] backed by a RON snapshot on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: Mutex<TodoTable>,
    generation: AtomicU64,
    stored_generation: AtomicU64,
}

impl FileStore {
    /// Opens the snapshot at `path`, provisioning an empty table when the
    /// file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = match fs::File::open(&path) {
            Ok(file) => match ron::de::from_reader(file)? {
                DataOwned::V1 { next_id, todos } => TodoTable { next_id, todos },
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => TodoTable::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self::with_table(path, table))
    }

    pub fn with_table(path: impl Into<PathBuf>, table: TodoTable) -> Self {
        Self {
            path: path.into(),
            table: Mutex::new(table),
            generation: AtomicU64::new(0),
            stored_generation: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    fn increment_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed)
    }

    /// Sibling file the snapshot is written to before it replaces the old one.
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Writes the snapshot unconditionally.
    ///
    /// The old snapshot is only replaced once the new one is fully written.
    pub async fn store(&self) -> Result<(), StoreError> {
        let table = self.table.lock().await;
        let generation = self.generation();
        let data = DataBorrowed::V1 {
            next_id: table.next_id,
            todos: &table.todos,
        };

        let ron = ron::ser::to_string_pretty(&data, Default::default())?;
        let staging = self.staging_path();
        fs::write(&staging, ron)?;
        fs::rename(&staging, &self.path)?;

        self.stored_generation.store(generation, Ordering::Relaxed);

        Ok(())
    }

    /// Writes the snapshot if the table changed since the last write.
    /// Returns whether anything was written.
    pub async fn flush(&self) -> Result<bool, StoreError> {
        if self.generation() == self.stored_generation.load(Ordering::Relaxed) {
            return Ok(false);
        }

        self.store().await?;
        Ok(true)
    }
}

#[async_trait]
impl TodoStore for FileStore {
    async fn find_all(&self, filter: TodoFilter) -> Vec<TodoItem> {
        self.table.lock().await.find_all(filter)
    }

    async fn find_by_id(&self, id: TodoId) -> Option<TodoItem> {
        self.table.lock().await.find_by_id(id).cloned()
    }

    async fn distinct_owners(&self) -> Vec<UserId> {
        self.table.lock().await.distinct_owners()
    }

    async fn create(&self, owner: UserId, description: &str) -> Result<TodoItem, StoreError> {
        let todo = self.table.lock().await.create(owner, description)?;
        self.increment_generation();
        Ok(todo)
    }

    async fn update(&self, id: TodoId, description: &str) -> Result<TodoItem, StoreError> {
        let todo = self.table.lock().await.update(id, description)?;
        self.increment_generation();
        Ok(todo)
    }

    async fn toggle_completed(&self, id: TodoId) -> Result<TodoItem, StoreError> {
        let todo = self.table.lock().await.toggle_completed(id)?;
        self.increment_generation();
        Ok(todo)
    }
}

#[derive(Serialize)]
enum DataBorrowed<'a> {
    V1 {
        next_id: u64,
        todos: &'a [TodoItem],
    },
}

#[derive(Deserialize)]
enum DataOwned {
    V1 { next_id: u64, todos: Vec<TodoItem> },
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data.ron")).unwrap();
        (dir, store)
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let mut table = TodoTable::default();

        let first = table.create(ALICE, "Buy milk").unwrap();
        let second = table.create(BOB, "Walk dog").unwrap();

        assert_eq!(first.id, TodoId(1));
        assert_eq!(second.id, TodoId(2));
        assert!(!first.completed);
        assert_eq!(table.len(), 2);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn create_rejects_blank_descriptions(#[case] description: &str) {
        let mut table = TodoTable::default();

        let result = table.create(ALICE, description);

        assert!(matches!(result, Err(StoreError::EmptyDescription)));
        assert!(table.is_empty());
    }

    #[test]
    fn update_with_blank_description_keeps_the_old_one() {
        let mut table = TodoTable::default();
        let todo = table.create(ALICE, "Buy milk").unwrap();

        let result = table.update(todo.id, "  ");

        assert!(matches!(result, Err(StoreError::EmptyDescription)));
        assert_eq!(table.find_by_id(todo.id).unwrap().description, "Buy milk");
    }

    #[test]
    fn update_rewrites_only_the_description() {
        let mut table = TodoTable::default();
        let todo = table.create(ALICE, "Buy milk").unwrap();
        table.toggle_completed(todo.id).unwrap();

        let updated = table.update(todo.id, " Buy oat milk ").unwrap();

        assert_eq!(updated.description, "Buy oat milk");
        assert_eq!(updated.owner_id, ALICE);
        assert!(updated.completed);
    }

    #[test]
    fn missing_ids_are_reported() {
        let mut table = TodoTable::default();

        assert!(table.find_by_id(TodoId(1)).is_none());
        assert!(matches!(
            table.update(TodoId(1), "x"),
            Err(StoreError::NotFound(TodoId(1)))
        ));
        assert!(matches!(
            table.toggle_completed(TodoId(1)),
            Err(StoreError::NotFound(TodoId(1)))
        ));
    }

    #[test]
    fn filters_by_owner_in_insertion_order() {
        let mut table = TodoTable::default();
        table.create(BOB, "b1").unwrap();
        table.create(ALICE, "a1").unwrap();
        table.create(BOB, "b2").unwrap();

        let bobs: Vec<_> = (table.find_all(TodoFilter::Owner(BOB)).into_iter())
            .map(|todo| todo.description)
            .collect();

        assert_eq!(bobs, ["b1", "b2"]);
        assert_eq!(table.find_all(TodoFilter::All).len(), 3);
        assert_eq!(table.distinct_owners(), [BOB, ALICE]);
    }

    #[test]
    fn from_items_continues_after_largest_id() {
        let mut table = TodoTable::from_items(vec![TodoItem {
            id: TodoId(42),
            owner_id: ALICE,
            description: String::from("Buy milk"),
            completed: false,
        }]);

        assert_eq!(table.create(ALICE, "next").unwrap().id, TodoId(43));
    }

    proptest! {
        #[test]
        fn created_todos_can_be_found(owner in 1u64..1000, description in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,40}") {
            let mut table = TodoTable::default();
            let created = table.create(UserId(owner), &description).unwrap();
            let found = table.find_by_id(created.id).unwrap();

            prop_assert_eq!(found.owner_id, UserId(owner));
            prop_assert_eq!(found.description.as_str(), description.trim());
            prop_assert!(!found.completed);
        }

        #[test]
        fn toggling_twice_restores_the_flag(toggles in 0usize..8) {
            let mut table = TodoTable::default();
            let todo = table.create(ALICE, "flip").unwrap();
            for _ in 0..toggles {
                table.toggle_completed(todo.id).unwrap();
            }

            prop_assert_eq!(table.find_by_id(todo.id).unwrap().completed, toggles % 2 == 1);
        }
    }

    #[tokio::test]
    async fn missing_snapshot_provisions_an_empty_table() {
        let (_dir, store) = temp_store();

        assert!(store.find_all(TodoFilter::All).await.is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let (dir, store) = temp_store();
        let milk = store.create(ALICE, "Buy milk").await.unwrap();
        store.create(BOB, "Walk dog").await.unwrap();
        store.toggle_completed(milk.id).await.unwrap();
        store.store().await.unwrap();

        let reopened = FileStore::open(dir.path().join("data.ron")).unwrap();

        assert_eq!(
            reopened.find_all(TodoFilter::All).await,
            store.find_all(TodoFilter::All).await
        );
        assert_eq!(
            reopened.create(ALICE, "third").await.unwrap().id,
            TodoId(3)
        );
    }

    #[tokio::test]
    async fn flush_only_writes_after_mutations() {
        let (_dir, store) = temp_store();

        assert!(!store.flush().await.unwrap());

        store.create(ALICE, "Buy milk").await.unwrap();
        assert!(store.flush().await.unwrap());
        assert!(store.path().exists());
        assert!(!store.flush().await.unwrap());

        assert!(store.create(ALICE, " ").await.is_err());
        assert!(!store.flush().await.unwrap());
    }

    #[test]
    fn corrupt_snapshot_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.ron");
        fs::write(&path, "not ron at all").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn concurrent_updates_are_last_write_wins() {
        let (_dir, store) = temp_store();
        let store = Arc::new(store);
        let todo = store.create(ALICE, "Buy milk").await.unwrap();

        let id = todo.id;
        let update = |description: &'static str| {
            let store = store.clone();
            tokio::spawn(async move { store.update(id, description).await })
        };
        let (first, second) = tokio::join!(update("first"), update("second"));
        let first = first.unwrap().unwrap();
        let second = second.unwrap().unwrap();

        let stored = store.find_by_id(todo.id).await.unwrap();
        assert!(["first", "second"].contains(&stored.description.as_str()));
        assert!(stored == first || stored == second);
    }

    #[tokio::test]
    async fn store_replaces_the_snapshot_through_a_staging_file() {
        let (dir, store) = temp_store();
        store.create(ALICE, "Buy milk").await.unwrap();
        store.store().await.unwrap();
        store.create(BOB, "Walk dog").await.unwrap();
        fs::write(store.staging_path(), "half a snap").unwrap();

        store.store().await.unwrap();

        assert!(!store.staging_path().exists());
        let reopened = FileStore::open(dir.path().join("data.ron")).unwrap();
        assert_eq!(reopened.find_all(TodoFilter::All).await.len(), 2);
    }

    #[tokio::test]
    async fn interrupted_write_leaves_the_old_snapshot_readable() {
        let (dir, store) = temp_store();
        store.create(ALICE, "Buy milk").await.unwrap();
        store.store().await.unwrap();
        fs::write(store.staging_path(), "(V1(next_id: 9, todos: [").unwrap();

        let reopened = FileStore::open(dir.path().join("data.ron")).unwrap();

        assert_eq!(reopened.find_all(TodoFilter::All).await.len(), 1);
    }
}
