use arena_core::{Error, Result};
use sqlx::Executor;
use std::path::Path;
use tracing::info;

use crate::database::Database;

/// Execute a `;`-separated SQL script on one connection, statement by statement.
pub async fn run_script(db: &Database, sql: String) -> Result<u64> {
    db.with_connection(move |conn| {
        Box::pin(async move {
            let done = conn
                .execute(sql.as_str())
                .await
                .map_err(|e| Error::Database(format!("Failed to run SQL script: {}", e)))?;
            Ok(done.rows_affected())
        })
    })
    .await
}

pub async fn run_script_file(db: &Database, path: &Path) -> Result<u64> {
    let sql = tokio::fs::read_to_string(path).await?;
    let affected = run_script(db, sql).await?;
    info!("Applied SQL script {} ({} rows affected)", path.display(), affected);
    Ok(affected)
}
