//! Spaced-repetition scheduling core of the study backend.
//!
//! `spaced_repetition_system` holds the pure SM-2 scheduler; `features::items`
//! wraps it in an owner-scoped item store backed by SQLite, and `handlers`
//! exposes that store over axum.

pub mod config;
pub mod data;
pub mod db;
pub mod features;
pub mod handlers;
pub mod schema;
pub mod spaced_repetition_system;
pub mod utils;

use axum::Router;
use time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub use db::DbPool;
pub use features::items::ItemService;

/// Builds the application router with its session layer
pub fn app(service: ItemService, session_inactivity_days: i64) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(session_inactivity_days)))
        .with_secure(false);

    routes(service).layer(session_layer)
}

/// Routes without the session layer, for callers that bring their own
pub fn routes(service: ItemService) -> Router {
    let api_router = Router::new().nest("/items", handlers::items::items_router(service));

    Router::new().nest("/api", api_router)
}
