/// How a [`crate::Database::transaction`] call ended.
///
/// A transaction whose body failed does not produce an outcome; the failure is returned
/// as an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    /// The body finished, no rollback was observed, and COMMIT was issued.
    Committed,
    /// A rollback notification fired while the transaction was open.
    RolledBack,
}

impl TxOutcome {
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(self, TxOutcome::Committed)
    }

    #[must_use]
    pub fn is_rolled_back(self) -> bool {
        matches!(self, TxOutcome::RolledBack)
    }
}
