use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

use serde::Serialize;

use super::row::{Row, index_columns};
use crate::types::RowValues;

/// The rows and counters produced by one statement of a batch.
///
/// `rows_affected` and `insert_id` are the connection counters read right after this
/// statement was stepped to completion. For statements that do not modify anything the
/// engine keeps reporting the values left behind by the last modifying statement.
///
/// A `ResultSet` does not point back at its batch. The other statements' result sets
/// are reached through the [`crate::BatchResult`] that owns them, whose clones all share
/// one sequence:
/// ```rust
/// # use websql_sync::prelude::*;
/// # fn main() -> Result<(), WebSqlError> {
/// let db = Database::open(":memory:")?;
/// let batch = db
///     .query("SELECT 1 AS n; SELECT 2 AS n", QueryOptions::new())?
///     .expect("two statements");
/// let handle = batch.clone();
/// let second = &handle.all()[1];
/// assert!(batch.same_batch(&handle));
/// assert_eq!(second[0].get("n"), Some(&RowValues::Int(2)));
/// assert!(std::ptr::eq(handle.primary(), &batch.all()[0]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    rows: Vec<Row>,
    /// Rows changed by the statement (`sqlite3_changes`)
    pub rows_affected: u64,
    /// Row id of the most recent successful INSERT (`sqlite3_last_insert_rowid`)
    pub insert_id: i64,
    #[serde(skip)]
    column_names: Arc<Vec<String>>,
    #[serde(skip)]
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set for the given columns.
    #[must_use]
    pub fn new(column_names: Vec<String>) -> ResultSet {
        let column_index = Arc::new(index_columns(&column_names));
        ResultSet {
            rows: Vec::new(),
            rows_affected: 0,
            insert_id: 0,
            column_names: Arc::new(column_names),
            column_index,
        }
    }

    /// Column names shared by every row.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Append a row of values, one per column.
    pub fn add_row_values(&mut self, values: Vec<RowValues>) {
        self.rows.push(Row::with_index(
            Arc::clone(&self.column_names),
            Arc::clone(&self.column_index),
            values,
        ));
    }

    pub(crate) fn set_counters(&mut self, rows_affected: u64, insert_id: i64) {
        self.rows_affected = rows_affected;
        self.insert_id = insert_id;
    }

    /// Indexable view over the rows (`item(i)` / `length()`).
    #[must_use]
    pub fn rows(&self) -> RowList<'_> {
        RowList { rows: &self.rows }
    }

    /// Number of rows, the same as `rows().length()`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl Index<usize> for ResultSet {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Read-only view over the rows of a [`ResultSet`].
///
/// `item` returns `None` past the end, so index-driven loops stop on their own:
/// ```rust
/// # use websql_sync::ResultSet;
/// # let rs = ResultSet::new(vec![]);
/// let mut i = 0;
/// while let Some(row) = rs.rows().item(i) {
///     # let _ = row;
///     i += 1;
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RowList<'a> {
    rows: &'a [Row],
}

impl<'a> RowList<'a> {
    /// The `index`-th row, the same row as `result_set[index]`.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&'a Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Row> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_is_the_indexed_row() {
        let mut rs = ResultSet::new(vec!["z".into()]);
        rs.add_row_values(vec![RowValues::Int(3)]);
        rs.add_row_values(vec![RowValues::Int(4)]);

        let rows = rs.rows();
        assert_eq!(rows.length(), 2);
        for i in 0..rows.length() {
            assert!(std::ptr::eq(rows.item(i).unwrap(), &rs[i]));
        }
        assert!(rows.item(rows.length()).is_none());
    }

    #[test]
    fn rows_share_column_names() {
        let mut rs = ResultSet::new(vec!["a".into(), "b".into()]);
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Null]);
        rs.add_row_values(vec![RowValues::Int(2), RowValues::Null]);
        assert!(Arc::ptr_eq(&rs[0].column_names, &rs[1].column_names));
        assert_eq!(rs[1].get("a"), Some(&RowValues::Int(2)));
    }

    #[test]
    fn serializes_counters_in_camel_case() {
        let mut rs = ResultSet::new(vec!["a".into()]);
        rs.add_row_values(vec![RowValues::Int(5)]);
        rs.set_counters(1, 2);
        let json = serde_json::to_value(&rs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"rows": [{"a": 5}], "rowsAffected": 1, "insertId": 2})
        );
    }
}
