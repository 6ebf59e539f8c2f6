// Shared fixtures: an in-memory arena database seeded from schema/arena.sql.
#![allow(dead_code)]

use arena_core::config::DatabaseConfig;
use arena_server::{create_router, ApiState};
use arena_storage::{script, Database, Reports, SqliteTableStore};
use axum::Router;
use std::sync::Arc;

pub const ARENA_SQL: &str = include_str!("../../schema/arena.sql");

/// One pooled connection, so every statement sees the same in-memory database.
pub fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        min_connections: 1,
        max_connections: 1,
        ..DatabaseConfig::default()
    }
}

pub async fn seeded_db() -> Database {
    let db = Database::connect(&memory_config()).await.unwrap();
    script::run_script(&db, ARENA_SQL.to_string()).await.unwrap();
    db
}

pub async fn seeded_store() -> SqliteTableStore {
    SqliteTableStore::new(seeded_db().await)
}

pub fn router_for(db: &Database) -> Router {
    let state = ApiState::new(
        Arc::new(SqliteTableStore::new(db.clone())),
        Arc::new(Reports::new(db.clone())),
    );
    create_router(state, false)
}
