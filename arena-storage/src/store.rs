use async_trait::async_trait;
use arena_core::{
    ColumnDescriptor, FilterSet, QueryResult, Result, RowData, Scalar, UpdateSpec,
};
use arena_query::{Placeholder, QueryBuilder, StatementPlan};
use tracing::{debug, info};

use crate::database::Database;
use crate::executor::{self, db_error};
use crate::introspect;

/// Generic access to any table the connected user can reach.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// True when the database answers a trivial query.
    async fn ping(&self) -> bool;

    /// Every row of `table`.
    async fn fetch_table(&self, table: &str) -> Result<QueryResult>;

    /// Rows of `table` matching every filter by equality.
    async fn select_rows(&self, table: &str, filters: &FilterSet) -> Result<QueryResult>;

    /// Declared columns of `table`; empty when the table is unknown.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Insert one row. `Ok(true)` when the row was written.
    async fn insert_row(&self, table: &str, row: &RowData) -> Result<bool>;

    /// Apply `new_`/`old_` update spec. `Ok(true)` when at least one row changed.
    async fn update_row(&self, table: &str, spec: &UpdateSpec) -> Result<bool>;

    /// Delete by single key; returns the number of rows removed.
    async fn delete_row(&self, table: &str, key_column: &str, key_value: Scalar) -> Result<u64>;
}

/// `TableStore` over the pooled SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteTableStore {
    db: Database,
    builder: QueryBuilder,
}

impl SqliteTableStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            builder: QueryBuilder::new(Placeholder::Question),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn query(&self, plan: StatementPlan, context: &'static str) -> Result<QueryResult> {
        self.db
            .with_connection(move |conn| {
                Box::pin(async move { executor::fetch(conn, &plan).await.map_err(db_error(context)) })
            })
            .await
    }

    async fn modify(&self, plan: StatementPlan, context: &'static str) -> Result<u64> {
        self.db
            .with_connection(move |conn| {
                Box::pin(async move { executor::execute(conn, &plan).await.map_err(db_error(context)) })
            })
            .await
    }
}

#[async_trait]
impl TableStore for SqliteTableStore {
    async fn ping(&self) -> bool {
        self.db.ping().await
    }

    async fn fetch_table(&self, table: &str) -> Result<QueryResult> {
        let plan = self.builder.select(table, &FilterSet::new());
        let result = self.query(plan, "Failed to fetch table data").await?;
        debug!("Fetched {} rows from {}", result.row_count(), table);
        Ok(result)
    }

    async fn select_rows(&self, table: &str, filters: &FilterSet) -> Result<QueryResult> {
        let plan = self.builder.select(table, filters);
        self.query(plan, "Failed to execute select").await
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let table = table.to_string();
        let schema = self.db.schema().to_string();
        self.db
            .with_connection(move |conn| {
                Box::pin(async move {
                    introspect::describe_table(conn, &table, &schema)
                        .await
                        .map_err(db_error("Failed to fetch table headers"))
                })
            })
            .await
    }

    async fn insert_row(&self, table: &str, row: &RowData) -> Result<bool> {
        let plan = self.builder.insert(table, row)?;
        let affected = self.modify(plan, "Failed to insert row").await?;
        info!("Inserted {} row(s) into {}", affected, table);
        Ok(affected > 0)
    }

    async fn update_row(&self, table: &str, spec: &UpdateSpec) -> Result<bool> {
        let plan = self.builder.update(table, spec)?;
        let affected = self.modify(plan, "Failed to update row").await?;
        info!("Updated {} row(s) in {}", affected, table);
        Ok(affected > 0)
    }

    async fn delete_row(&self, table: &str, key_column: &str, key_value: Scalar) -> Result<u64> {
        let plan = self.builder.delete(table, key_column, key_value);
        let affected = self.modify(plan, "Failed to delete row").await?;
        info!("Deleted {} row(s) from {}", affected, table);
        Ok(affected)
    }
}
