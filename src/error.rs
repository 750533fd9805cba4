use thiserror::Error;

/// Errors surfaced by the adapter.
///
/// Engine failures (including SQL that fails to prepare) are carried verbatim in
/// [`WebSqlError::SqliteError`]. A transaction that rolled back is not an error; see
/// [`crate::TxOutcome`].
#[derive(Debug, Error)]
pub enum WebSqlError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),
}
