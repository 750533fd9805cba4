use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::result_set::ResultSet;

/// Outcome of one batch: every statement's [`ResultSet`] in source order.
///
/// A `BatchResult` always holds at least one result set; a batch that contained no
/// statements yields `None` instead. It dereferences to the primary (first) result set,
/// so `batch.insert_id` or `batch.rows()` read the first statement's outcome while
/// [`BatchResult::all`] reaches the others. Clones share the same sequence.
#[derive(Debug, Clone)]
pub struct BatchResult {
    all: Arc<[ResultSet]>,
}

impl BatchResult {
    /// Wrap the result sets of a batch; `None` when the batch produced nothing.
    #[must_use]
    pub fn from_results(results: Vec<ResultSet>) -> Option<Self> {
        if results.is_empty() {
            None
        } else {
            Some(Self {
                all: results.into(),
            })
        }
    }

    /// The first statement's result set.
    #[must_use]
    pub fn primary(&self) -> &ResultSet {
        &self.all[0]
    }

    /// Every statement's result set, in source order.
    #[must_use]
    pub fn all(&self) -> &[ResultSet] {
        &self.all
    }

    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.all.len()
    }

    /// True when both handles come from the same batch.
    #[must_use]
    pub fn same_batch(&self, other: &BatchResult) -> bool {
        Arc::ptr_eq(&self.all, &other.all)
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.all().serialize(serializer)
    }
}

impl Deref for BatchResult {
    type Target = ResultSet;

    fn deref(&self) -> &ResultSet {
        self.primary()
    }
}
