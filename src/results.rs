//! Result views handed back to callers.

mod batch;
mod result_set;
mod row;

pub use batch::BatchResult;
pub use result_set::{ResultSet, RowList};
pub use row::Row;
