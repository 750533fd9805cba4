use std::collections::HashMap;

use rusqlite::Statement;
use tracing::trace;

use crate::error::WebSqlError;
use crate::types::RowValues;

/// Placeholder markers tried, in order, when a named key is given without one.
const NAME_MARKERS: [char; 3] = [':', '$', '@'];

/// Parameters supplied with a batch.
///
/// The shape is fixed when the value is built:
/// - `Positional` values are handed out left to right across every placeholder of every
///   statement in the batch. A later statement continues where the previous one stopped.
/// - `Named` values are looked up by placeholder name for each statement and are never
///   consumed, so the same key can feed several statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    Positional(Vec<RowValues>),
    Named(HashMap<String, RowValues>),
}

impl Parameters {
    #[must_use]
    pub fn positional(values: Vec<RowValues>) -> Self {
        Parameters::Positional(values)
    }

    /// Build named parameters. Keys may carry their marker (`$x`, `:x`, `@x`) or be bare
    /// (`x`), in which case the value goes to every marker form of that name the statement
    /// declares.
    pub fn named<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RowValues)>,
    {
        Parameters::Named(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<Vec<RowValues>> for Parameters {
    fn from(values: Vec<RowValues>) -> Self {
        Parameters::Positional(values)
    }
}

impl From<HashMap<String, RowValues>> for Parameters {
    fn from(values: HashMap<String, RowValues>) -> Self {
        Parameters::Named(values)
    }
}

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> rusqlite::types::Value {
    match value {
        RowValues::Int(i) => rusqlite::types::Value::Integer(*i),
        RowValues::Float(f) => rusqlite::types::Value::Real(*f),
        RowValues::Text(s) => rusqlite::types::Value::Text(s.clone()),
        RowValues::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => rusqlite::types::Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => rusqlite::types::Value::Null,
        RowValues::JSON(jval) => rusqlite::types::Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
    }
}

/// Walks a [`Parameters`] value across the statements of one batch.
///
/// The caller's parameters are only borrowed; the cursor keeps its own position into a
/// positional list.
#[derive(Debug)]
pub(crate) struct ParameterCursor<'p> {
    params: Option<&'p Parameters>,
    next: usize,
}

impl<'p> ParameterCursor<'p> {
    pub(crate) fn new(params: Option<&'p Parameters>) -> Self {
        Self { params, next: 0 }
    }

    /// Next unconsumed positional value, if any.
    fn take_positional(&mut self) -> Option<&'p RowValues> {
        match self.params {
            Some(Parameters::Positional(values)) => {
                let value = values.get(self.next)?;
                self.next += 1;
                Some(value)
            }
            _ => None,
        }
    }

    /// Positional values not yet handed out.
    pub(crate) fn remaining(&self) -> usize {
        match self.params {
            Some(Parameters::Positional(values)) => values.len().saturating_sub(self.next),
            _ => 0,
        }
    }

    /// Bind this cursor's parameters to a freshly prepared statement.
    ///
    /// Placeholders left without a positional value stay unbound (NULL). Named keys
    /// the statement does not declare are ignored. Bare keys are bound before keys that
    /// carry a marker, so `:x` wins over `x` for the `:x` placeholder whatever the map
    /// order.
    ///
    /// # Errors
    /// Returns `WebSqlError::SqliteError` if the engine rejects a binding.
    pub(crate) fn bind(&mut self, stmt: &mut Statement<'_>) -> Result<usize, WebSqlError> {
        let mut bound = 0;
        let params = self.params;
        match params {
            None => {}
            Some(Parameters::Positional(_)) => {
                for index in 1..=stmt.parameter_count() {
                    let Some(value) = self.take_positional() else {
                        break;
                    };
                    trace!(index, ?value, "binding positional parameter");
                    stmt.raw_bind_parameter(index, row_value_to_sqlite_value(value))?;
                    bound += 1;
                }
            }
            Some(Parameters::Named(values)) => {
                let (marked, bare): (Vec<_>, Vec<_>) =
                    values.iter().partition(|(key, _)| has_marker(key));
                for (key, value) in bare.into_iter().chain(marked) {
                    let indexes = resolve_name(stmt, key)?;
                    if indexes.is_empty() {
                        trace!(key = %key, "named parameter not used by statement");
                    }
                    for index in indexes {
                        trace!(key = %key, index, ?value, "binding named parameter");
                        stmt.raw_bind_parameter(index, row_value_to_sqlite_value(value))?;
                        bound += 1;
                    }
                }
            }
        }
        Ok(bound)
    }
}

fn has_marker(key: &str) -> bool {
    key.starts_with(NAME_MARKERS) || key.starts_with('?')
}

fn resolve_name(stmt: &Statement<'_>, key: &str) -> Result<Vec<usize>, WebSqlError> {
    if has_marker(key) {
        return Ok(stmt.parameter_index(key)?.into_iter().collect());
    }
    let mut indexes = Vec::new();
    for marker in NAME_MARKERS {
        if let Some(index) = stmt.parameter_index(&format!("{marker}{key}"))? {
            indexes.push(index);
        }
    }
    Ok(indexes)
}
