//! Customer read API with live change streaming.
//!
//! This crate serves a read-only customer listing out of PostgreSQL and fans
//! store change notifications out to any number of connected
//! Server-Sent-Events clients.

pub mod config;
pub mod database;
pub mod error;
pub mod hub;
pub mod json;
pub mod notify;
pub mod routes;

pub use config::{Args, ServerConfig};
pub use error::AppError;
pub use hub::BroadcastHub;

use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// Broadcast hub for live update streams.
    pub hub: Arc<BroadcastHub>,
    /// Server configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(pool: PgPool, hub: Arc<BroadcastHub>, config: ServerConfig) -> Self {
        Self { pool, hub, config }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(state.config.cors_origin.clone()))
        .allow_methods([Method::GET]);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::customers::routes())
        .merge(routes::stream::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
