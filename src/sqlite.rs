// SQLite adapter, split by concern:
// - config: open options and builder
// - connection: the `Database` entry point
// - events: engine hook fan-out and listener guards
// - params: parameter shapes and binding
// - query: the statement sequencer behind `query`
// - transaction: BEGIN/COMMIT bracket with rollback detection

pub mod config;
pub mod connection;
pub mod events;
pub mod params;
pub mod query;
pub mod transaction;

pub use config::{DatabaseOptions, DatabaseOptionsBuilder, IN_MEMORY};
pub use connection::Database;
pub use events::{DbEvent, EventHandler, EventKind, ListenerGuard, ListenerId, UpdateAction};
pub use params::{Parameters, row_value_to_sqlite_value};
pub use query::{QueryOptions, run_batch, run_statements};
pub use transaction::{ExecuteOptions, Transaction, TransactionCallbacks};
