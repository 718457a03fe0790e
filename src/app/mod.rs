use axum::Router;
use sqlx::SqlitePool;

/// Human-readable application name, used in log lines and lock messages.
pub const APP_NAME: &str = "Transloom";

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

/// App routes (membership management). Merged into the full router in lib.rs.
pub fn routes() -> Router<AppState> {
    Router::new().merge(features::routes())
}

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod memberships;
pub mod single_writer;
pub mod tenant;
