// Pooled database handle: explicit connect, scoped acquisition, explicit close.

use arena_core::config::DatabaseConfig;
use arena_core::{Error, Result};
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info, warn};

/// Cloneable handle to the connection pool. Clones share the pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
    schema: String,
    close_grace: Duration,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| Error::Configuration(format!("Invalid database url '{}': {}", config.url, e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout());

        // An in-memory database lives only as long as its connection.
        if is_in_memory(&config.url) {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        } else {
            pool_options = pool_options.idle_timeout(config.idle_timeout());
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to open connection pool: {}", e)))?;

        info!(
            "Connection pool started ({}..{} connections)",
            config.min_connections, config.max_connections
        );

        Ok(Self {
            pool,
            schema: config.schema.clone(),
            close_grace: config.close_grace(),
        })
    }

    /// Schema name the introspector matches table owners against.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Run `action` on one pooled connection. The connection goes back to the
    /// pool when this returns, whether `action` succeeded or failed.
    pub async fn with_connection<T, F>(&self, action: F) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>>,
    {
        let result = match self.pool.acquire().await {
            Ok(mut conn) => action(&mut *conn).await,
            Err(e) => Err(Error::Database(format!("Failed to acquire connection: {}", e))),
        };
        if let Err(e) = &result {
            if !e.is_client_error() {
                error!("Database error: {}", e);
            }
        }
        result
    }

    /// True when a connection can be acquired and answers `SELECT 1`.
    pub async fn ping(&self) -> bool {
        self.with_connection(|conn| {
            Box::pin(async move {
                sqlx::query("SELECT 1")
                    .execute(&mut *conn)
                    .await
                    .map(|_| ())
                    .map_err(|e| Error::Database(e.to_string()))
            })
        })
        .await
        .is_ok()
    }

    /// Close the pool, waiting up to the configured grace period for
    /// checked-out connections to come back.
    pub async fn close(&self) {
        info!("Closing connection pool");
        match tokio::time::timeout(self.close_grace, self.pool.close()).await {
            Ok(()) => info!("Pool closed"),
            Err(_) => warn!(
                "Pool close exceeded {:?} grace period; abandoning busy connections",
                self.close_grace
            ),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
