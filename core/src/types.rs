//! Domain types for the todo service.
//!
//! # Design
//! `TodoItem` is the persisted record and the response payload at once; its
//! serde shape (camelCase keys, integer priority, RFC 3339 timestamps) is
//! the on-disk format. `TodoCreate` and `TodoUpdate` are produced by the
//! validation layer and never deserialized directly from client input.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Urgency of a todo, stored as the integers 1 through 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

/// Raised when an integer does not name a `Priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("priority must be 1, 2 or 3, got {0}")]
pub struct InvalidPriority(pub i64);

impl TryFrom<i64> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(InvalidPriority(other)),
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Priority::try_from(i64::from(value))
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

/// A single todo item as stored on disk and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoItem {
    /// Builds a fresh, incomplete item with a new id and both timestamps set
    /// to now.
    pub fn new(input: TodoCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every field present in `changes`. Timestamps are left alone.
    pub fn apply(&mut self, changes: TodoUpdate) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
    }

    /// Refreshes `updated_at`, always moving it strictly forward.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Validated input for creating a todo, with defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoCreate {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl TodoCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
        }
    }
}

/// Validated partial update. `None` leaves the stored field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}
