//! Error types for the todo store.
//!
//! # Design
//! `NotFound` gets a dedicated variant because it is an expected outcome
//! that callers map to a 404. Everything else means the backing file could
//! not be read, parsed or written, and is surfaced as an internal failure.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No todo with this id exists in the collection.
    #[error("todo {0} not found")]
    NotFound(Uuid),

    /// A todo with this id is already stored.
    #[error("todo {0} already exists")]
    DuplicateId(Uuid),

    /// The backing file or its directory could not be accessed.
    #[error("todo store I/O failed")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold a valid todo collection.
    #[error("todo store serialization failed")]
    Serialization(#[from] serde_json::Error),
}
