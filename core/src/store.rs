//! Flat-file persistence for todo items.
//!
//! # Design
//! The whole collection lives in one pretty-printed JSON array. Every call
//! makes sure the file exists, reads the full array, works on it in memory
//! and, for mutations, writes the full array back. A crash in the middle of
//! a write can leave the file truncated; nothing here tries to repair it.
//!
//! All operations take `guard` for their whole read-modify-write cycle.
//! Without it, two overlapping mutations would each write back their own
//! copy and the later write would silently drop the earlier one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{TodoItem, TodoUpdate};

const EMPTY_COLLECTION: &[u8] = b"[]";

/// Owner of the todo collection persisted at `path`.
#[derive(Debug)]
pub struct TodoStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl TodoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty collection file if either
    /// is missing. An existing file is never touched, so repeated calls are
    /// harmless.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        file.write_all(EMPTY_COLLECTION).await?;
        file.flush().await?;
        debug!(path = %self.path.display(), "initialized empty todo store");
        Ok(())
    }

    /// Appends `item` and persists. The item is returned as stored.
    pub async fn create(&self, item: TodoItem) -> Result<TodoItem, StoreError> {
        let _guard = self.guard.lock().await;
        let mut todos = self.load().await?;
        if todos.iter().any(|todo| todo.id == item.id) {
            return Err(StoreError::DuplicateId(item.id));
        }
        todos.push(item.clone());
        self.persist(&todos).await?;
        Ok(item)
    }

    /// Returns every item in insertion order.
    pub async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        let _guard = self.guard.lock().await;
        self.load().await
    }

    /// Looks up one item. A missing id is `Ok(None)`, not an error.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
        let _guard = self.guard.lock().await;
        let todos = self.load().await?;
        Ok(todos.into_iter().find(|todo| todo.id == id))
    }

    /// Merges `changes` into the item and refreshes `updated_at`.
    pub async fn update(&self, id: Uuid, changes: TodoUpdate) -> Result<TodoItem, StoreError> {
        self.modify(id, |todo| todo.apply(changes)).await
    }

    /// Removes the item permanently and returns it.
    pub async fn delete(&self, id: Uuid) -> Result<TodoItem, StoreError> {
        let _guard = self.guard.lock().await;
        let mut todos = self.load().await?;
        let index = position(&todos, id)?;
        let removed = todos.remove(index);
        self.persist(&todos).await?;
        Ok(removed)
    }

    /// Marks the item completed and refreshes `updated_at`.
    pub async fn complete(&self, id: Uuid) -> Result<TodoItem, StoreError> {
        self.modify(id, |todo| todo.completed = true).await
    }

    async fn modify<F>(&self, id: Uuid, change: F) -> Result<TodoItem, StoreError>
    where
        F: FnOnce(&mut TodoItem),
    {
        let _guard = self.guard.lock().await;
        let mut todos = self.load().await?;
        let index = position(&todos, id)?;
        let todo = &mut todos[index];
        change(&mut *todo);
        todo.touch();
        let updated = todo.clone();
        self.persist(&todos).await?;
        Ok(updated)
    }

    async fn load(&self) -> Result<Vec<TodoItem>, StoreError> {
        self.ensure_exists().await?;
        let raw = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn persist(&self, todos: &[TodoItem]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(todos)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

fn position(todos: &[TodoItem], id: Uuid) -> Result<usize, StoreError> {
    todos
        .iter()
        .position(|todo| todo.id == id)
        .ok_or(StoreError::NotFound(id))
}
