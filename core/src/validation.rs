//! Shape checks for inbound create and update payloads.
//!
//! # Design
//! Payloads arrive as untyped JSON. Each known field is checked on its own
//! and every violation is collected, so a client sees all of its mistakes in
//! one response. Unknown keys are ignored, which means system-assigned
//! fields (`id`, `completed`, timestamps) cannot be set from a payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Priority, TodoCreate, TodoUpdate};

const TITLE: &str = "title";
const DESCRIPTION: &str = "description";
const PRIORITY: &str = "priority";

const MIN_PRIORITY: i64 = 1;
const MAX_PRIORITY: i64 = 3;

/// One offending field and why it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path of the field; empty when the payload itself has the wrong shape.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A payload failed validation. Holds one entry per violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload failed validation on {} field(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

/// Validates a create payload and applies defaults for omitted fields.
///
/// `title` is required and must be non-empty. `description` may be omitted,
/// in which case it defaults to the empty string, but an explicit value must
/// be non-empty. `priority` defaults to `Priority::Medium`.
pub fn validate_create(payload: &Value) -> Result<TodoCreate, ValidationError> {
    let fields = as_object(payload)?;
    let mut errors = Vec::new();

    if !fields.contains_key(TITLE) {
        errors.push(FieldError::new(TITLE, "Required"));
    }
    let title = read_non_empty(fields, TITLE, &mut errors);
    let description = read_non_empty(fields, DESCRIPTION, &mut errors);
    let priority = read_priority(fields, &mut errors);

    match title {
        Some(title) if errors.is_empty() => Ok(TodoCreate {
            title,
            description: description.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
        }),
        _ => Err(ValidationError { errors }),
    }
}

/// Validates a partial update. Every field is optional and nothing is
/// defaulted: an absent field stays `None`.
pub fn validate_update(payload: &Value) -> Result<TodoUpdate, ValidationError> {
    let fields = as_object(payload)?;
    let mut errors = Vec::new();

    let update = TodoUpdate {
        title: read_non_empty(fields, TITLE, &mut errors),
        description: read_non_empty(fields, DESCRIPTION, &mut errors),
        priority: read_priority(fields, &mut errors),
    };

    if errors.is_empty() {
        Ok(update)
    } else {
        Err(ValidationError { errors })
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload.as_object().ok_or_else(|| ValidationError {
        errors: vec![FieldError::new(
            "",
            format!("Expected object, received {}", kind_of(payload)),
        )],
    })
}

fn read_non_empty(
    fields: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = read_string(fields, field, errors)?;
    if value.is_empty() {
        errors.push(FieldError::new(
            field,
            "String must contain at least 1 character(s)",
        ));
        return None;
    }
    Some(value)
}

fn read_string(
    fields: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match fields.get(field)? {
        Value::String(value) => Some(value.clone()),
        other => {
            errors.push(FieldError::new(
                field,
                format!("Expected string, received {}", kind_of(other)),
            ));
            None
        }
    }
}

fn read_priority(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<Priority> {
    let value = fields.get(PRIORITY)?;
    let Value::Number(number) = value else {
        errors.push(FieldError::new(
            PRIORITY,
            format!("Expected number, received {}", kind_of(value)),
        ));
        return None;
    };

    let message = if let Some(integer) = number.as_i64() {
        match Priority::try_from(integer) {
            Ok(priority) => return Some(priority),
            Err(_) => out_of_range(integer < MIN_PRIORITY),
        }
    } else if number.is_u64() {
        out_of_range(false)
    } else {
        match number.as_f64() {
            Some(float) if float.fract() == 0.0 && float < MIN_PRIORITY as f64 => out_of_range(true),
            Some(float) if float.fract() == 0.0 && float > MAX_PRIORITY as f64 => out_of_range(false),
            Some(float) if float.fract() == 0.0 => return Priority::try_from(float as i64).ok(),
            _ => "Expected integer, received float".to_string(),
        }
    };
    errors.push(FieldError::new(PRIORITY, message));
    None
}

fn out_of_range(below: bool) -> String {
    if below {
        format!("Number must be greater than or equal to {MIN_PRIORITY}")
    } else {
        format!("Number must be less than or equal to {MAX_PRIORITY}")
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
