use crate::value::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column name to value, in the order the caller supplied them.
pub type FilterSet = IndexMap<String, Scalar>;

/// Column name to value for a new row.
pub type RowData = IndexMap<String, Scalar>;

/// `old_<col>` / `new_<col>` keyed values for an update.
pub type UpdateSpec = IndexMap<String, Scalar>;

/// A row keyed by a hand-written field list.
pub type Record = IndexMap<String, Scalar>;

/// Positional result set: every row has `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl QueryResult {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
