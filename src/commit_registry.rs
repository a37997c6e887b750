// ============================================================================
// Commit Registry
// ============================================================================
//
// Records the terminal status of every transaction that has finished: which
// ids committed and which aborted. A TID absent from both sets is still
// in progress.
//
// ============================================================================

use crate::transaction::TransactionId;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct CommitRegistry {
    committed: HashSet<TransactionId>,
    aborted: HashSet<TransactionId>,
}

impl CommitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_committed(&mut self, tid: TransactionId) {
        debug_assert!(!self.aborted.contains(&tid), "tid already aborted");
        self.committed.insert(tid);
    }

    pub fn mark_aborted(&mut self, tid: TransactionId) {
        debug_assert!(!self.committed.contains(&tid), "tid already committed");
        self.aborted.insert(tid);
    }

    pub fn is_committed(&self, tid: TransactionId) -> bool {
        self.committed.contains(&tid)
    }

    pub fn is_aborted(&self, tid: TransactionId) -> bool {
        self.aborted.contains(&tid)
    }

    /// True iff `tid` is absent from both terminal sets.
    pub fn is_in_progress(&self, tid: TransactionId) -> bool {
        !self.is_committed(tid) && !self.is_aborted(tid)
    }
}
