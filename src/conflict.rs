// ============================================================================
// Conflict Detector
// ============================================================================
//
// The classical first-committer-wins rule, relaxed by comparing against
// `snapshot.xmin` rather than `snapshot.xmax` as the threshold: a concurrent
// writer whose TID is older than our own xmin but that only committed after
// we began is tolerated rather than flagged. This exact threshold must be
// preserved to match observed behavior.
//
// ============================================================================

use crate::commit_registry::CommitRegistry;
use crate::core::DbError;
use crate::storage::RowStore;
use crate::transaction::Transaction;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    /// Inspect every key `txn` has written against the versions currently
    /// committed-or-pending in `store`. Returns the first conflict found, or
    /// `None` if the write set is clear to apply.
    pub fn detect(&self, txn: &Transaction, store: &RowStore, registry: &CommitRegistry) -> Option<DbError> {
        for key in txn.writes().keys() {
            for version in store.all_versions(key) {
                if version.xmin == txn.id() {
                    continue;
                }
                if registry.is_committed(version.xmin) && version.xmin >= txn.snapshot().xmin {
                    return Some(DbError::WriteWriteConflict(key.clone()));
                }
            }
        }
        None
    }
}
