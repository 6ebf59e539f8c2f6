use arena_core::{QueryResult, Record, Scalar};

/// Positional result shape: headers in column order, rows untouched.
pub fn to_tabular<I, S>(columns: I, rows: Vec<Vec<Scalar>>) -> QueryResult
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let headers: Vec<String> = columns.into_iter().map(Into::into).collect();
    debug_assert!(
        rows.iter().all(|r| r.len() == headers.len()),
        "row arity does not match header count"
    );
    QueryResult::new(headers, rows)
}

/// Zip each row against a hand-written field list.
///
/// Only for fixed queries whose select list matches `field_names` exactly;
/// a mismatch is a bug in the query, not a runtime condition.
pub fn to_named_records<S: AsRef<str>>(rows: Vec<Vec<Scalar>>, field_names: &[S]) -> Vec<Record> {
    rows.into_iter()
        .map(|row| {
            debug_assert_eq!(
                row.len(),
                field_names.len(),
                "row arity does not match field list"
            );
            field_names
                .iter()
                .map(|name| name.as_ref().to_string())
                .zip(row)
                .collect()
        })
        .collect()
}
