// ============================================================================
// Visibility Engine
// ============================================================================
//
// A pure function over (row, snapshot, registry): decides whether a row
// version is observable from a given snapshot, and whether a version is
// eligible for garbage collection given the global GC horizon.
//
// Implemented as a zero-field unit struct rather than a struct that stores
// `&CommitRegistry`, so that `Database::commit` can hold `&mut CommitRegistry`
// at the same time the conflict detector borrows it immutably — no lifetime
// is entangled with the orchestrator.
// ============================================================================

use crate::commit_registry::CommitRegistry;
use crate::core::{Snapshot, VersionedRow};
use crate::transaction::TransactionId;

#[derive(Debug, Default, Clone, Copy)]
pub struct VisibilityEngine;

impl VisibilityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether `tid` is visible to `snapshot`, i.e. whether it is a
    /// transaction this snapshot can regard as committed.
    ///
    /// The `active` check must dominate the numeric comparison: a
    /// transaction in `snapshot.active` can have a TID less than
    /// `snapshot.xmax`, and checking `tid >= xmax` first would wrongly
    /// treat it as visible.
    pub fn txn_visible(&self, tid: TransactionId, snapshot: &Snapshot, registry: &CommitRegistry) -> bool {
        if tid >= snapshot.xmax {
            return false;
        }
        if snapshot.active.contains(&tid) {
            return false;
        }
        registry.is_committed(tid)
    }

    /// Whether `row` is observable from `snapshot`.
    ///
    /// Documented limitation, preserved for semantic parity with the
    /// original: this does not consult the commit registry for the
    /// "happened after snapshot" branch. If a deleter's TID is >=
    /// `snapshot.xmax` but that deleter later aborted, the row's deletion
    /// is still treated as if it had occurred. This is benign only because
    /// no snapshot with `xmax` greater than that deleter's TID has yet been
    /// able to observe these versions — by the time such a snapshot exists,
    /// the deleter's abort will already be reflected in the registry and
    /// `txn_visible` will correctly return `false` for it.
    pub fn is_visible(&self, row: &VersionedRow, snapshot: &Snapshot, registry: &CommitRegistry) -> bool {
        if row.xmin == snapshot.my_txn_id {
            return row.xmax != Some(snapshot.my_txn_id);
        }

        if !self.txn_visible(row.xmin, snapshot, registry) {
            return false;
        }

        match row.xmax {
            None => true,
            Some(deleter) => !self.txn_visible(deleter, snapshot, registry),
        }
    }

    /// Whether `row` can be dropped by GC once `oldest_xmin` is the global
    /// horizon. An undeleted version is never collectible; a deleted one
    /// requires both its creator and its deleter to be beneath the horizon,
    /// since a deleter that is not yet beneath it could still be observed
    /// by some live snapshot.
    pub fn can_collect(&self, row: &VersionedRow, oldest_xmin: TransactionId) -> bool {
        match row.xmax {
            None => false,
            Some(xmax) => row.xmin < oldest_xmin && xmax < oldest_xmin,
        }
    }
}
