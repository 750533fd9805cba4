use std::fmt;
use std::sync::Arc;

use rusqlite::Connection;
use tracing::debug;

use crate::error::WebSqlError;
use crate::results::BatchResult;

use super::config::DatabaseOptions;
use super::events::{DbEvent, EventKind, EventRegistry, ListenerGuard, ListenerId, install_hooks};
use super::query::{QueryOptions, run_batch};

/// An open database plus the listener table fed by its engine hooks.
///
/// Every call blocks until the engine is done. The handle is meant for one caller at a
/// time; share it across threads only behind your own lock.
pub struct Database {
    conn: Connection,
    events: Arc<EventRegistry>,
    options: DatabaseOptions,
}

impl Database {
    /// Open (or create) the database at `path`; `":memory:"` opens a private in-memory one.
    ///
    /// # Errors
    /// Returns `WebSqlError::ConnectionError` if the engine cannot open the path.
    pub fn open(path: impl Into<String>) -> Result<Self, WebSqlError> {
        Self::open_with(DatabaseOptions::new(path))
    }

    /// Open a database from explicit options.
    ///
    /// # Errors
    /// Returns `WebSqlError::ConfigError` for invalid options, `ConnectionError` if the
    /// engine cannot open the path, and `SqliteError` if applying a pragma fails.
    pub fn open_with(options: DatabaseOptions) -> Result<Self, WebSqlError> {
        options.validate()?;
        let conn = Connection::open(&options.path).map_err(|e| {
            WebSqlError::ConnectionError(format!("failed to open {}: {e}", options.path))
        })?;

        if let Some(timeout) = options.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        if options.wal {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }

        let events = Arc::new(EventRegistry::default());
        install_hooks(&conn, &events);
        debug!(path = %options.path, "database opened");

        Ok(Self {
            conn,
            events,
            options,
        })
    }

    /// Close the engine handle.
    ///
    /// # Errors
    /// Returns `WebSqlError::SqliteError` if the engine refuses to close.
    pub fn close(self) -> Result<(), WebSqlError> {
        let path = self.options.path;
        self.conn.close().map_err(|(_, e)| WebSqlError::SqliteError(e))?;
        debug!(path = %path, "database closed");
        Ok(())
    }

    /// Options the database was opened with, metadata included.
    #[must_use]
    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Run `sql` for its side effects only; no rows are collected.
    ///
    /// # Errors
    /// Returns `WebSqlError::SqliteError` if any statement fails.
    pub fn exec(&self, sql: &str) -> Result<(), WebSqlError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run every statement in `sql` and collect one result set per statement.
    ///
    /// Returns `Ok(None)` when `sql` contains no statement at all. On success the
    /// `on_complete` continuation of `options`, if any, receives the same value before it
    /// is returned; that includes the `None` of an empty batch.
    ///
    /// ```rust
    /// # use websql_sync::prelude::*;
    /// # fn main() -> Result<(), WebSqlError> {
    /// let db = Database::open(":memory:")?;
    /// db.exec("CREATE TABLE egg (a, y, e)")?;
    /// let batch = db
    ///     .query(
    ///         "INSERT INTO egg (a) VALUES (?); SELECT a FROM egg",
    ///         QueryOptions::new().parameters(vec![RowValues::Int(5)]),
    ///     )?
    ///     .expect("two statements");
    /// assert_eq!(batch.rows_affected, 1);
    /// assert_eq!(batch.all()[1].rows().length(), 1);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns `WebSqlError::SqliteError` for the first statement the engine rejects.
    /// Statements that ran before it are not undone.
    pub fn query(
        &self,
        sql: &str,
        options: QueryOptions<'_>,
    ) -> Result<Option<BatchResult>, WebSqlError> {
        let QueryOptions {
            parameters,
            on_complete,
        } = options;
        let batch = run_batch(&self.conn, sql, parameters.as_ref())?;
        if let Some(on_complete) = on_complete {
            on_complete(batch.as_ref());
        }
        Ok(batch)
    }

    /// Rows changed by the most recent statement.
    #[must_use]
    pub fn changes(&self) -> u64 {
        self.conn.changes()
    }

    /// Row id of the most recent successful INSERT on this connection, or 0 if none.
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// True when no explicit transaction is open on the engine.
    #[must_use]
    pub fn is_autocommit(&self) -> bool {
        self.conn.is_autocommit()
    }

    /// Register `handler` for `kind` until [`Database::remove_listener`] is called.
    ///
    /// # Arguments
    ///
    /// * `kind` - which notification to receive
    /// * `handler` - called synchronously, in registration order with other listeners
    ///   of the same kind
    ///
    /// # Returns
    ///
    /// The id to pass to [`Database::remove_listener`].
    pub fn add_listener<F>(&self, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&DbEvent) + Send + Sync + 'static,
    {
        self.events.add(kind, Arc::new(handler))
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.events.remove(id)
    }

    /// Register `handler` for as long as the returned guard lives.
    pub fn listen<F>(&self, kind: EventKind, handler: F) -> ListenerGuard<'_>
    where
        F: Fn(&DbEvent) + Send + Sync + 'static,
    {
        let id = self.add_listener(kind, handler);
        ListenerGuard::new(&self.events, id)
    }

    /// Listeners currently registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.events.count(kind)
    }

    /// Borrow the underlying rusqlite connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.options.path)
            .field("autocommit", &self.conn.is_autocommit())
            .field("events", &self.events)
            .finish()
    }
}
