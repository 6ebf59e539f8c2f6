// Schema introspection against SQLite's table-valued catalog pragmas.

use arena_core::{ColumnDescriptor, Scalar};
use arena_query::StatementPlan;
use sqlx::sqlite::SqliteConnection;

use crate::executor;

// Table name and owning schema are both compared upper-cased.
const DESCRIBE_COLUMNS: &str = r#"SELECT c.name, c.type, c."notnull"
FROM pragma_table_list AS t
JOIN pragma_table_info(t.name, t.schema) AS c
WHERE UPPER(t.name) = ?1 AND UPPER(t.schema) = ?2"#;

/// Declared columns of `table` in `schema`. An unknown table yields an empty list.
pub async fn describe_table(
    conn: &mut SqliteConnection,
    table: &str,
    schema: &str,
) -> Result<Vec<ColumnDescriptor>, sqlx::Error> {
    let plan = StatementPlan::new(
        DESCRIBE_COLUMNS,
        vec![
            Scalar::Text(table.to_uppercase()),
            Scalar::Text(schema.to_uppercase()),
        ],
    );
    let result = executor::fetch(conn, &plan).await?;

    Ok(result
        .rows
        .into_iter()
        .filter_map(|row| match row.as_slice() {
            [Scalar::Text(name), declared, not_null] => Some(ColumnDescriptor::from_declared(
                name.clone(),
                declared.as_str().unwrap_or(""),
                matches!(not_null, Scalar::Int(n) if *n != 0),
            )),
            _ => None,
        })
        .collect())
}
