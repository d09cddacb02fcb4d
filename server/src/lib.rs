//! HTTP surface of the todo service.
//!
//! # Overview
//! Mounts the todo routes under `/api/v1` on an axum `Router`. Persistence
//! lives in `todo_core::TodoStore`; handlers only translate between HTTP and
//! store calls.
//!
//! # Design
//! - `AppState` is cheap to clone and holds the store behind an `Arc`.
//! - Unmatched routes and unsupported methods fall through to a JSON 404.
//! - `error::report_unhandled` wraps every route so internal failures are
//!   logged in exactly one place.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use todo_core::TodoStore;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;

pub use config::{Config, ConfigError, Environment};
pub use error::{ApiError, ErrorBody};
pub use handlers::{HealthResponse, TodoResponse};

pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(TodoStore::new(config.db_path.clone())),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(handlers::hello))
        .route("/health", get(handlers::health))
        .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route("/todos/{id}/complete", put(handlers::complete_todo));

    let router = Router::new()
        .nest(API_PREFIX, api)
        .route(&format!("{API_PREFIX}/"), get(handlers::hello));
    with_error_layers(router, state)
}

/// Wraps `router` with the shared outer behavior: JSON 404 for unknown paths
/// and unsupported methods, panic recovery, failure reporting, tracing and
/// CORS.
pub fn with_error_layers(router: Router<AppState>, state: AppState) -> Router {
    router
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error::report_unhandled,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the app on `listener` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
