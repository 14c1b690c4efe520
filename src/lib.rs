pub mod auth;
pub mod config;
pub mod dav_path;
pub mod dav_xml;
pub mod db;
pub mod errors;
pub mod models;
pub mod path_locks;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use config::Config;
use db::Database;
use path_locks::PathLocks;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub locks: Arc<PathLocks>,
}

/// Health check endpoint for monitoring
pub async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({"status": "ok"})))
}
