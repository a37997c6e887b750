use super::{Transaction, TransactionId};
use crate::core::Snapshot;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Allocates monotone transaction ids, builds snapshots, and tracks the set
/// of currently in-progress transactions together with the snapshot each one
/// is reading under (needed to compute `global_oldest_xmin`).
///
/// The TID counter and active table are plain fields on the manager
/// instance rather than process-global state, so independently
/// constructed managers have independent TID sequences that never leak
/// into each other.
#[derive(Debug)]
pub struct TransactionManager {
    next_tid: u64,
    active: HashMap<TransactionId, Snapshot>,
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionManager {
    pub fn new() -> Self {
        Self {
            next_tid: 1,
            active: HashMap::new(),
        }
    }

    /// The next id that will be assigned to a transaction begun right now.
    pub fn next_txn_id(&self) -> TransactionId {
        TransactionId::from_raw(self.next_tid)
    }

    /// The currently in-progress transaction ids.
    pub fn active_txns(&self) -> HashSet<TransactionId> {
        self.active.keys().copied().collect()
    }

    /// Allocate a new transaction id, build its snapshot from the current
    /// live set, and register it as in-progress.
    #[tracing::instrument(skip(self), fields(tid))]
    pub fn begin(&mut self) -> Transaction {
        let id = TransactionId::from_raw(self.next_tid);
        self.next_tid += 1;
        tracing::Span::current().record("tid", id.as_u64());

        // `active`'s keys at this instant are exactly the TIDs strictly less
        // than `id` that are still in progress; `id` itself isn't inserted
        // until just below, so self-exclusion is automatic.
        let active_ids: HashSet<TransactionId> = self.active.keys().copied().collect();
        let snapshot = Snapshot::new(id, Arc::new(active_ids));

        self.active.insert(id, snapshot.clone());

        tracing::debug!(txn = %id, "began transaction");
        Transaction::new(id, snapshot)
    }

    /// Remove `txn`'s id from the active table. Registry bookkeeping
    /// (marking committed) is the caller's responsibility.
    pub fn commit(&mut self, txn: &Transaction) {
        self.active.remove(&txn.id());
    }

    /// Remove `txn`'s id from the active table.
    pub fn abort(&mut self, txn: &Transaction) {
        self.active.remove(&txn.id());
    }

    /// The cut-off below which no live snapshot can observe anything: the
    /// minimum `xmin` across all active transactions' snapshots, or the
    /// next-to-be-assigned TID when none are active.
    ///
    /// Note this is computed from snapshots' `xmin`, not from the active
    /// TIDs themselves.
    pub fn global_oldest_xmin(&self) -> TransactionId {
        self.active
            .values()
            .map(|s| s.xmin)
            .min()
            .unwrap_or_else(|| TransactionId::from_raw(self.next_tid))
    }
}
