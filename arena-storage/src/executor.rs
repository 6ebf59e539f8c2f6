// Runs statement plans on a single connection and decodes result cells.

use arena_core::{Error, QueryResult, Scalar};
use arena_query::{to_tabular, StatementPlan};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Column, Executor, Row, Sqlite, Statement, TypeInfo, ValueRef};
use tracing::{debug, trace};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Wrap a driver error with the operation that failed, keeping the driver text.
pub fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Database(format!("{}: {}", context, e))
}

/// Run a row-returning plan. Headers come from the prepared statement, so an
/// empty result still carries its column names.
pub async fn fetch(
    conn: &mut SqliteConnection,
    plan: &StatementPlan,
) -> Result<QueryResult, sqlx::Error> {
    log_plan(plan);
    let statement = (&mut *conn).prepare(plan.sql.as_str()).await?;
    let headers: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let rows = bind_all(statement.query(), &plan.binds)
        .fetch_all(&mut *conn)
        .await?;
    let rows = rows
        .iter()
        .map(decode_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(to_tabular(headers, rows))
}

/// Run a data-modifying plan and return the affected row count.
/// No transaction is opened, so the statement commits on its own.
pub async fn execute(conn: &mut SqliteConnection, plan: &StatementPlan) -> Result<u64, sqlx::Error> {
    log_plan(plan);
    let result = bind_all(sqlx::query(plan.sql.as_str()), &plan.binds)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

fn log_plan(plan: &StatementPlan) {
    debug!(sql = %plan.sql, binds = plan.binds.len(), "Executing statement");
    trace!("Query: {}", plan.display_sql());
}

fn bind_all<'q>(mut query: SqliteQuery<'q>, binds: &'q [Scalar]) -> SqliteQuery<'q> {
    for value in binds {
        query = match value {
            Scalar::Null => query.bind(None::<String>),
            Scalar::Bool(b) => query.bind(*b),
            Scalar::Int(i) => query.bind(*i),
            Scalar::Float(f) => query.bind(*f),
            Scalar::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

/// Decode every cell by its runtime storage class; no coercion beyond that.
pub fn decode_row(row: &SqliteRow) -> Result<Vec<Scalar>, sqlx::Error> {
    (0..row.len()).map(|i| decode_cell(row, i)).collect()
}

fn decode_cell(row: &SqliteRow, index: usize) -> Result<Scalar, sqlx::Error> {
    let storage_class = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Scalar::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    let value = match storage_class.as_str() {
        "INTEGER" | "BIGINT" | "BOOLEAN" => Scalar::Int(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => Scalar::Float(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Scalar::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Scalar::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
