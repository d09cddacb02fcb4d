//! HTTP-facing error type and the top-level failure reporter.
//!
//! # Design
//! Expected outcomes (`Validation`, `BadRequest`, `NotFound`) turn directly
//! into JSON bodies carrying at least a `message`. Internal failures render a
//! generic message and stash the error chain in a response extension;
//! `report_unhandled` is the single place that logs it and, outside
//! production, copies it into the body as `stack`. Handler panics take the
//! same path through `panic_response`.

use std::any::Any;
use std::error::Error as _;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todo_core::{FieldError, StoreError, ValidationError};

use crate::AppState;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// JSON body sent with every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
            stack: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Todo not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(#[source] StoreError),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Diagnostic detail of an internal failure, carried from `ApiError` to
/// `report_unhandled` through the response extensions.
#[derive(Debug, Clone)]
pub struct FailureDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::Validation(err) => {
                let body = ErrorBody {
                    errors: Some(err.errors),
                    ..ErrorBody::message(message)
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::message(message))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(ErrorBody::message(message))).into_response()
            }
            ApiError::Internal(err) => {
                let mut response =
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::message(message)))
                        .into_response();
                response
                    .extensions_mut()
                    .insert(FailureDetail(error_chain(&err)));
                response
            }
        }
    }
}

fn error_chain(err: &StoreError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str("\ncaused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Turns a handler panic into the generic 500, carrying the panic message
/// as failure detail.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::message(INTERNAL_MESSAGE)),
    )
        .into_response();
    response
        .extensions_mut()
        .insert(FailureDetail(format!("handler panicked: {detail}")));
    response
}

/// Logs every internal failure and, unless running in production, exposes
/// its detail to the client as `stack`.
pub async fn report_unhandled(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;

    let Some(FailureDetail(detail)) = response.extensions().get::<FailureDetail>().cloned() else {
        return response;
    };
    tracing::error!(%method, %uri, status = %response.status(), error = %detail, "request failed");

    if state.config.environment.is_production() {
        return response;
    }
    let body = ErrorBody {
        stack: Some(detail),
        ..ErrorBody::message(INTERNAL_MESSAGE)
    };
    (response.status(), Json(body)).into_response()
}
