use std::fmt;

use rusqlite::{Batch, Connection, Statement};
use tracing::debug;

use crate::error::WebSqlError;
use crate::results::{BatchResult, ResultSet};
use crate::types::RowValues;

use super::params::{ParameterCursor, Parameters};

type OnComplete<'a> = Box<dyn FnOnce(Option<&BatchResult>) + 'a>;

/// Per-call configuration for [`crate::Database::query`].
///
/// `on_complete` runs exactly once per successful batch, after every statement has
/// finished. It receives `None` when the SQL held no statement. A failed batch never
/// reaches it.
#[derive(Default)]
pub struct QueryOptions<'a> {
    pub(crate) parameters: Option<Parameters>,
    pub(crate) on_complete: Option<OnComplete<'a>>,
}

impl<'a> QueryOptions<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for the batch, positional or named.
    ///
    /// # Arguments
    ///
    /// * `parameters` - a `Vec<RowValues>` (positional), a name-to-value map, or an
    ///   explicit [`Parameters`]
    #[must_use]
    pub fn parameters(mut self, parameters: impl Into<Parameters>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    /// Continuation called with the batch outcome before `query` returns.
    #[must_use]
    pub fn on_complete<F>(mut self, on_complete: F) -> Self
    where
        F: FnOnce(Option<&BatchResult>) + 'a,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl From<Parameters> for QueryOptions<'_> {
    fn from(parameters: Parameters) -> Self {
        Self::new().parameters(parameters)
    }
}

impl From<Vec<RowValues>> for QueryOptions<'_> {
    fn from(values: Vec<RowValues>) -> Self {
        Self::new().parameters(values)
    }
}

impl fmt::Debug for QueryOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("parameters", &self.parameters)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Run every statement of `sql` in source order, one result set per statement.
///
/// Each statement is prepared from the text left over by the previous one, bound from the
/// shared parameter cursor, stepped until exhausted and finalized before the next one is
/// prepared. A statement that fails to prepare or step aborts the batch; statements that
/// already ran are not undone here.
///
/// # Errors
/// Returns `WebSqlError::SqliteError` for the first statement the engine rejects.
pub fn run_statements(
    conn: &Connection,
    sql: &str,
    params: Option<&Parameters>,
) -> Result<Vec<ResultSet>, WebSqlError> {
    let mut cursor = ParameterCursor::new(params);
    let mut all = Vec::new();
    let mut batch = Batch::new(conn, sql);

    while let Some(mut stmt) = batch.next()? {
        let bound = cursor.bind(&mut stmt)?;
        debug!(statement = all.len(), bound, "executing statement");

        let mut result_set = step_to_completion(&mut stmt)?;
        result_set.set_counters(conn.changes(), conn.last_insert_rowid());
        debug!(
            statement = all.len(),
            rows = result_set.len(),
            rows_affected = result_set.rows_affected,
            insert_id = result_set.insert_id,
            "statement finished"
        );
        all.push(result_set);

        stmt.finalize()?;
    }

    if cursor.remaining() > 0 {
        debug!(unused = cursor.remaining(), "positional parameters left unbound");
    }
    Ok(all)
}

/// Run a batch and wrap the outcome; `None` when `sql` held no statement.
///
/// # Errors
/// Returns `WebSqlError::SqliteError` for the first statement the engine rejects.
pub fn run_batch(
    conn: &Connection,
    sql: &str,
    params: Option<&Parameters>,
) -> Result<Option<BatchResult>, WebSqlError> {
    run_statements(conn, sql, params).map(BatchResult::from_results)
}

fn step_to_completion(stmt: &mut Statement<'_>) -> Result<ResultSet, WebSqlError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();
    let mut result_set = ResultSet::new(column_names);

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(RowValues::from(row.get_ref(i)?));
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE egg (a, y, e)").unwrap();
        conn
    }

    #[test]
    fn one_result_set_per_statement() {
        let conn = conn();
        let all = run_statements(
            &conn,
            "INSERT INTO egg (a) VALUES (1); INSERT INTO egg (a) VALUES (2); SELECT a FROM egg;",
            None,
        )
        .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].insert_id, 1);
        assert_eq!(all[1].insert_id, 2);
        assert_eq!(all[2].len(), 2);
    }

    #[test]
    fn blank_text_has_no_statements() {
        let conn = conn();
        assert!(run_statements(&conn, "", None).unwrap().is_empty());
        assert!(run_statements(&conn, "  \n ; ", None).unwrap().is_empty());
        assert!(run_batch(&conn, "   ", None).unwrap().is_none());
    }

    #[test]
    fn earlier_statements_stay_applied_after_failure() {
        let conn = conn();
        let err = run_statements(
            &conn,
            "INSERT INTO egg (a) VALUES (1); NOT SQL AT ALL;",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, WebSqlError::SqliteError(_)));

        let count: i64 = conn
            .query_row("SELECT count(*) FROM egg", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
