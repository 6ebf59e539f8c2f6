// CRUD statement construction over caller-named tables and columns.
//
// Table and column names are interpolated (see `SqlWriter::push_ident`);
// every value travels as a bind parameter.

use crate::plan::{Placeholder, SqlWriter, StatementPlan};
use arena_core::{Error, FilterSet, Result, RowData, Scalar, UpdateSpec};

/// Update-spec key prefix naming a column to assign.
pub const NEW_PREFIX: &str = "new_";
/// Update-spec key prefix naming a predicate column.
pub const OLD_PREFIX: &str = "old_";

/// Builds CRUD plans with a fixed bind-marker style.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    placeholder: Placeholder,
}

impl QueryBuilder {
    pub fn new(placeholder: Placeholder) -> Self {
        Self { placeholder }
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// `SELECT * FROM <table> [WHERE c1 = :1 AND c2 = :2 ...]`
    pub fn select(&self, table: &str, filters: &FilterSet) -> StatementPlan {
        let mut w = SqlWriter::new(self.placeholder);
        w.push("SELECT * FROM ").push_ident(table);
        if !filters.is_empty() {
            w.push(" WHERE ").push_assignments(
                filters.iter().map(|(column, value)| (column.as_str(), value.clone())),
                " AND ",
            );
        }
        w.finish()
    }

    /// `SELECT c1, c2, ... FROM <table>`
    pub fn select_columns<S: AsRef<str>>(&self, table: &str, columns: &[S]) -> Result<StatementPlan> {
        if columns.is_empty() {
            return Err(Error::Validation("At least one column is required.".to_string()));
        }

        let mut w = SqlWriter::new(self.placeholder);
        w.push("SELECT ");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_ident(column.as_ref());
        }
        w.push(" FROM ").push_ident(table);
        Ok(w.finish())
    }

    /// `INSERT INTO <table> (c1, c2, ...) VALUES (:1, :2, ...)`
    pub fn insert(&self, table: &str, row: &RowData) -> Result<StatementPlan> {
        if row.is_empty() {
            return Err(Error::Validation(
                "Row data is required. Provide at least one column value.".to_string(),
            ));
        }

        let mut w = SqlWriter::new(self.placeholder);
        w.push("INSERT INTO ").push_ident(table).push(" (");
        for (i, column) in row.keys().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_ident(column);
        }
        w.push(") VALUES (");
        for (i, value) in row.values().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_bind(value.clone());
        }
        w.push(")");
        Ok(w.finish())
    }

    /// `UPDATE <table> SET n1 = :1, ... WHERE o1 = :k+1 AND ...`
    ///
    /// Keys without either prefix are ignored. Binds are all `new_` values
    /// followed by all `old_` values, each in the order given.
    pub fn update(&self, table: &str, spec: &UpdateSpec) -> Result<StatementPlan> {
        let (assignments, conditions) = partition_update_spec(spec);

        if assignments.is_empty() {
            return Err(Error::Validation(
                "No columns to update. Provide at least one new_ value.".to_string(),
            ));
        }
        if conditions.is_empty() {
            return Err(Error::Validation(
                "No conditions provided. Provide at least one old_ value.".to_string(),
            ));
        }

        let mut w = SqlWriter::new(self.placeholder);
        w.push("UPDATE ")
            .push_ident(table)
            .push(" SET ")
            .push_assignments(assignments, ", ")
            .push(" WHERE ")
            .push_assignments(conditions, " AND ");
        Ok(w.finish())
    }

    /// `DELETE FROM <table> WHERE <key_column> = :1`
    pub fn delete(&self, table: &str, key_column: &str, key_value: Scalar) -> StatementPlan {
        let mut w = SqlWriter::new(self.placeholder);
        w.push("DELETE FROM ")
            .push_ident(table)
            .push(" WHERE ")
            .push_ident(key_column)
            .push(" = ")
            .push_bind(key_value);
        w.finish()
    }
}

pub fn build_select(table: &str, filters: &FilterSet) -> StatementPlan {
    QueryBuilder::default().select(table, filters)
}

pub fn build_insert(table: &str, row: &RowData) -> Result<StatementPlan> {
    QueryBuilder::default().insert(table, row)
}

pub fn build_update(table: &str, spec: &UpdateSpec) -> Result<StatementPlan> {
    QueryBuilder::default().update(table, spec)
}

pub fn build_delete(table: &str, key_column: &str, key_value: Scalar) -> StatementPlan {
    QueryBuilder::default().delete(table, key_column, key_value)
}

type Pairs<'a> = Vec<(&'a str, Scalar)>;

fn partition_update_spec(spec: &UpdateSpec) -> (Pairs<'_>, Pairs<'_>) {
    let mut assignments = Vec::new();
    let mut conditions = Vec::new();
    for (key, value) in spec {
        if let Some(column) = key.strip_prefix(NEW_PREFIX) {
            assignments.push((column, value.clone()));
        } else if let Some(column) = key.strip_prefix(OLD_PREFIX) {
            conditions.push((column, value.clone()));
        }
    }
    (assignments, conditions)
}
