//! Domain core for the todo service.
//!
//! # Overview
//! Holds the `TodoItem` model, payload validation and the flat-file
//! `TodoStore`. Nothing here knows about HTTP; the server crate translates
//! `StoreError` and `ValidationError` into responses.
//!
//! # Design
//! - The store re-reads the whole JSON file on every call and rewrites it in
//!   full on every mutation. No state is cached between calls.
//! - A per-store mutex serializes each read-modify-write cycle, so two
//!   concurrent mutations cannot lose each other's writes.
//! - Validation works on raw `serde_json::Value` payloads so that every
//!   offending field is reported, not just the first one serde trips over.

pub mod error;
pub mod store;
pub mod types;
pub mod validation;

pub use error::StoreError;
pub use store::TodoStore;
pub use types::{InvalidPriority, Priority, TodoCreate, TodoItem, TodoUpdate};
pub use validation::{validate_create, validate_update, FieldError, ValidationError};
