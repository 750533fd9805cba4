use std::time::Duration;

use crate::error::WebSqlError;

use super::connection::Database;

/// Path that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Options for opening a [`Database`].
///
/// `version`, `display_name` and `estimated_size` are the descriptive metadata of the
/// historical `openDatabaseSync` call. They are kept for callers to read back but do not
/// change how the database is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseOptions {
    pub path: String,
    pub version: Option<String>,
    pub display_name: Option<String>,
    pub estimated_size: Option<u64>,
    /// Switch the journal to WAL right after opening.
    pub wal: bool,
    pub busy_timeout: Option<Duration>,
}

impl DatabaseOptions {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: None,
            display_name: None,
            estimated_size: None,
            wal: false,
            busy_timeout: None,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    pub(crate) fn validate(&self) -> Result<(), WebSqlError> {
        if self.path.trim().is_empty() {
            return Err(WebSqlError::ConfigError(
                "database path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`DatabaseOptions`].
#[derive(Debug, Clone)]
pub struct DatabaseOptionsBuilder {
    opts: DatabaseOptions,
}

impl DatabaseOptionsBuilder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            opts: DatabaseOptions::new(path),
        }
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.opts.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.opts.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn estimated_size(mut self, estimated_size: u64) -> Self {
        self.opts.estimated_size = Some(estimated_size);
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn finish(self) -> DatabaseOptions {
        self.opts
    }

    /// Open the database.
    ///
    /// # Errors
    /// Returns `WebSqlError` if the options are invalid or the engine cannot open the path.
    pub fn open(self) -> Result<Database, WebSqlError> {
        Database::open_with(self.finish())
    }

    /// Open the database and hand it to `on_create` before returning it.
    ///
    /// # Errors
    /// Returns `WebSqlError` if the options are invalid or the engine cannot open the path.
    pub fn open_with_callback<F>(self, on_create: F) -> Result<Database, WebSqlError>
    where
        F: FnOnce(&Database),
    {
        let db = self.open()?;
        on_create(&db);
        Ok(db)
    }
}
