//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The `/caja` REST routes
//! - The caller identity extractor
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use caja_db::DrawerStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger store.
    pub store: Arc<dyn DrawerStore>,
}

impl AppState {
    /// Wraps a store for sharing across handlers.
    pub fn new(store: impl DrawerStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
