//! Convenient imports for common functionality.

pub use crate::error::WebSqlError;
pub use crate::results::{BatchResult, ResultSet, Row, RowList};
pub use crate::sqlite::{
    Database, DatabaseOptions, DatabaseOptionsBuilder, DbEvent, EventKind, ExecuteOptions,
    ListenerGuard, ListenerId, Parameters, QueryOptions, Transaction, TransactionCallbacks,
    UpdateAction,
};
pub use crate::tx_outcome::TxOutcome;
pub use crate::types::RowValues;
pub use crate::open_database;
