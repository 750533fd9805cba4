use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::error::WebSqlError;
use crate::results::BatchResult;
use crate::tx_outcome::TxOutcome;
use crate::types::RowValues;

use super::connection::Database;
use super::events::EventKind;
use super::params::Parameters;
use super::query::run_batch;

type OnExecute<'a> = Box<dyn FnOnce(&Transaction<'_>, Option<&BatchResult>) + 'a>;
type OnFinish<'a> = Box<dyn FnOnce(&Transaction<'_>) + 'a>;

/// Per-call configuration for [`Transaction::execute_sql`].
#[derive(Default)]
pub struct ExecuteOptions<'a> {
    parameters: Option<Parameters>,
    on_complete: Option<OnExecute<'a>>,
}

impl<'a> ExecuteOptions<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for the batch; positional values carry across its statements.
    #[must_use]
    pub fn parameters(mut self, parameters: impl Into<Parameters>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    /// Continuation called with the transaction and the batch outcome once the
    /// statements have run.
    ///
    /// # Arguments
    ///
    /// * `on_complete` - receives `None` for SQL without statements. It is not called
    ///   when the batch fails or is skipped because the transaction already rolled back.
    #[must_use]
    pub fn on_complete<F>(mut self, on_complete: F) -> Self
    where
        F: FnOnce(&Transaction<'_>, Option<&BatchResult>) + 'a,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl From<Parameters> for ExecuteOptions<'_> {
    fn from(parameters: Parameters) -> Self {
        Self::new().parameters(parameters)
    }
}

impl From<Vec<RowValues>> for ExecuteOptions<'_> {
    fn from(values: Vec<RowValues>) -> Self {
        Self::new().parameters(values)
    }
}

impl fmt::Debug for ExecuteOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("parameters", &self.parameters)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Continuations for [`Database::transaction`]: `on_success` after a commit, `on_error`
/// after an observed rollback. At most one of them runs.
#[derive(Default)]
pub struct TransactionCallbacks<'a> {
    on_error: Option<OnFinish<'a>>,
    on_success: Option<OnFinish<'a>>,
}

impl<'a> TransactionCallbacks<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs after the transaction ended in a rollback.
    #[must_use]
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: FnOnce(&Transaction<'_>) + 'a,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Runs after COMMIT when no rollback was observed.
    #[must_use]
    pub fn on_success<F>(mut self, on_success: F) -> Self
    where
        F: FnOnce(&Transaction<'_>) + 'a,
    {
        self.on_success = Some(Box::new(on_success));
        self
    }
}

impl fmt::Debug for TransactionCallbacks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionCallbacks")
            .field("on_error", &self.on_error.is_some())
            .field("on_success", &self.on_success.is_some())
            .finish()
    }
}

/// Handle given to a transaction body.
///
/// Once a rollback has been observed, [`Transaction::execute_sql`] stops sending
/// statements to the engine and returns `Ok(None)`.
pub struct Transaction<'db> {
    database: &'db Database,
    rolled_back: Arc<AtomicBool>,
}

impl<'db> Transaction<'db> {
    fn new(database: &'db Database) -> Self {
        Self {
            database,
            rolled_back: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The database this transaction runs on. Statements issued through it directly
    /// still count toward rollback detection.
    #[must_use]
    pub fn database(&self) -> &'db Database {
        self.database
    }

    /// True once a rollback notification fired during this transaction. Never resets.
    #[must_use]
    pub fn rolled_back(&self) -> bool {
        self.rolled_back.load(Ordering::SeqCst)
    }

    /// Run a batch inside the transaction.
    ///
    /// # Returns
    ///
    /// The batch, `None` for SQL without statements, or `None` without touching the
    /// engine once the transaction has rolled back.
    ///
    /// # Errors
    /// Returns `WebSqlError::SqliteError` for the first statement the engine rejects.
    pub fn execute_sql(
        &self,
        sql: &str,
        options: ExecuteOptions<'_>,
    ) -> Result<Option<BatchResult>, WebSqlError> {
        if self.rolled_back() {
            debug!(sql, "transaction rolled back; statement skipped");
            return Ok(None);
        }
        let ExecuteOptions {
            parameters,
            on_complete,
        } = options;
        let batch = run_batch(self.database.connection(), sql, parameters.as_ref())?;
        if let Some(on_complete) = on_complete {
            on_complete(self, batch.as_ref());
        }
        Ok(batch)
    }
}

impl fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("rolled_back", &self.rolled_back())
            .finish()
    }
}

impl Database {
    /// Run `body` between `BEGIN TRANSACTION` and `COMMIT`.
    ///
    /// A rollback listener is registered for the duration of the call. If it fires (for
    /// example because the body ran `ROLLBACK`), later statements are skipped, the
    /// closing COMMIT becomes a no-op, `on_error` runs and the outcome is
    /// [`TxOutcome::RolledBack`]. Otherwise `on_success` runs and the outcome is
    /// [`TxOutcome::Committed`].
    ///
    /// # Errors
    /// Any error from BEGIN, the body or COMMIT is returned unchanged. The listener is
    /// removed first and, if the engine is still inside the transaction, it is rolled back.
    pub fn transaction<F>(
        &self,
        body: F,
        callbacks: TransactionCallbacks<'_>,
    ) -> Result<TxOutcome, WebSqlError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<(), WebSqlError>,
    {
        let tx = Transaction::new(self);
        let flag = Arc::clone(&tx.rolled_back);
        let guard = self.listen(EventKind::Rollback, move |_| {
            flag.store(true, Ordering::SeqCst);
        });

        debug!("transaction begin");
        tx.execute_sql("BEGIN TRANSACTION", ExecuteOptions::new())?;

        let run = body(&tx).and_then(|()| tx.execute_sql("COMMIT", ExecuteOptions::new()));
        drop(guard);
        if let Err(err) = run {
            self.abandon_transaction();
            return Err(err);
        }

        let TransactionCallbacks {
            on_error,
            on_success,
        } = callbacks;
        if tx.rolled_back() {
            debug!("transaction rolled back");
            if let Some(on_error) = on_error {
                on_error(&tx);
            }
            Ok(TxOutcome::RolledBack)
        } else {
            debug!("transaction committed");
            if let Some(on_success) = on_success {
                on_success(&tx);
            }
            Ok(TxOutcome::Committed)
        }
    }

    fn abandon_transaction(&self) {
        if self.is_autocommit() {
            return;
        }
        debug!("rolling back after failed transaction body");
        if let Err(err) = self.exec("ROLLBACK") {
            warn!(error = %err, "rollback after failed transaction body failed");
        }
    }
}
