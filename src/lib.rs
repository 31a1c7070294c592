pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod scanner;
pub mod submit;

use std::sync::Arc;
use config::Config;
use sqlx::SqlitePool;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: SqlitePool,
}
