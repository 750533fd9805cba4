//! Synchronous, batch-oriented SQL adapter over SQLite in the style of the Web SQL
//! `openDatabaseSync` API.
//!
//! A single [`Database::query`] call may carry several `;`-separated statements. Each one
//! is prepared, bound, stepped and finalized in turn, and the call returns a
//! [`BatchResult`] holding one [`ResultSet`] per statement. [`Database::transaction`]
//! wraps a body in BEGIN/COMMIT and reports whether a rollback was observed.
//!
//! ```rust
//! use websql_sync::prelude::*;
//!
//! # fn main() -> Result<(), WebSqlError> {
//! let db = Database::open(":memory:")?;
//! db.exec("CREATE TABLE tex (t, e, x)")?;
//!
//! let outcome = db.transaction(
//!     |tx| {
//!         tx.execute_sql(
//!             "INSERT INTO tex (t, e, x) VALUES (?, ?, ?)",
//!             ExecuteOptions::new().parameters(vec![
//!                 RowValues::Text("this".into()),
//!                 RowValues::Text("is".into()),
//!                 RowValues::Text("Sparta".into()),
//!             ]),
//!         )?;
//!         Ok(())
//!     },
//!     TransactionCallbacks::new(),
//! )?;
//! assert!(outcome.is_committed());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod prelude;
pub mod results;
pub mod sqlite;
pub mod tx_outcome;
pub mod types;

pub use error::WebSqlError;
pub use results::{BatchResult, ResultSet, Row, RowList};
pub use sqlite::{
    Database, DatabaseOptions, DatabaseOptionsBuilder, DbEvent, EventKind, ExecuteOptions,
    ListenerGuard, ListenerId, Parameters, QueryOptions, Transaction, TransactionCallbacks,
    UpdateAction,
};
pub use tx_outcome::TxOutcome;
pub use types::RowValues;

/// Open a database the way `openDatabaseSync(name, version, displayName, estimatedSize,
/// creationCallback)` does: the metadata is recorded, not interpreted, and
/// `on_create` sees the database before it is returned.
///
/// # Errors
/// Returns `WebSqlError` if the database cannot be opened.
pub fn open_database<F>(
    name: &str,
    version: &str,
    display_name: &str,
    estimated_size: u64,
    on_create: F,
) -> Result<Database, WebSqlError>
where
    F: FnOnce(&Database),
{
    DatabaseOptionsBuilder::new(name)
        .version(version)
        .display_name(display_name)
        .estimated_size(estimated_size)
        .open_with_callback(on_create)
}
