// ============================================================================
// Database Service (Orchestrator)
// ============================================================================
//
// Wires the transaction manager, commit registry, visibility engine, row
// store and conflict detector together behind the public begin / insert /
// update / delete / select / commit / abort / garbage_collect surface.
//
// ============================================================================

use crate::commit_registry::CommitRegistry;
use crate::conflict::ConflictDetector;
use crate::core::{DbError, Record, Result, VersionedRow, merge_records};
use crate::storage::RowStore;
use crate::storage::row_store::splice;
use crate::transaction::{Transaction, TransactionManager};
use crate::visibility::VisibilityEngine;

/// The transactional kernel's single entry point. Owns every shared mutable
/// resource: the TID counter and active set (inside `txn_manager`), the
/// commit registry, and the row store. All operations are synchronous; the
/// caller is responsible for serializing concurrent access (no internal
/// locking).
#[derive(Debug, Default)]
pub struct Database {
    txn_manager: TransactionManager,
    registry: CommitRegistry,
    visibility: VisibilityEngine,
    store: RowStore,
    conflicts: ConflictDetector,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new transaction: allocate a TID, build its snapshot, and
    /// register it as in-progress.
    pub fn begin(&mut self) -> Transaction {
        self.txn_manager.begin()
    }

    /// Buffer an insert on `txn`. Never fails: no visibility check, no
    /// uniqueness check.
    #[tracing::instrument(skip(self, txn, data), fields(txn = %txn.id(), key))]
    pub fn insert(&mut self, txn: &mut Transaction, key: impl Into<String>, data: Record) {
        debug_assert!(txn.state().is_active(), "insert on a non-active transaction");
        let key = key.into();
        tracing::Span::current().record("key", key.as_str());
        let row = VersionedRow::inserted(key.clone(), data, txn.id());
        txn.add_write(key, row);
        tracing::debug!("buffered insert");
    }

    /// The versions `key` would have if `txn`'s own pending writes were
    /// applied on top of the row store right now: the committed versions,
    /// with `txn`'s own buffered rows for this key spliced in using the
    /// same tombstone-replace-in-place rule a real commit would use. A
    /// transaction's own writes are invisible to everyone else until
    /// commit, but must be visible to itself — this is the one place that
    /// overlay happens, shared by `select`, `update`, and `delete`.
    fn effective_versions(&self, txn: &Transaction, key: &str) -> Vec<VersionedRow> {
        let mut versions = self.store.all_versions(key).to_vec();
        if let Some(pending) = txn.writes().get(key) {
            for row in pending {
                splice(&mut versions, row.clone());
            }
        }
        versions
    }

    /// Buffer an update on `txn`: a tombstone of the currently visible
    /// version followed by a new version carrying the shallow-merged data,
    /// both appended to the write buffer in that order.
    #[tracing::instrument(skip(self, txn, data), fields(txn = %txn.id(), key = %key))]
    pub fn update(&mut self, txn: &mut Transaction, key: &str, data: Record) -> Result<()> {
        if !txn.state().is_active() {
            return Err(DbError::TransactionNotActive(txn.id()));
        }

        let versions = self.effective_versions(txn, key);
        if versions.is_empty() {
            return Err(DbError::KeyNotFound(key.to_string()));
        }

        let visible = versions
            .iter()
            .find(|row| self.visibility.is_visible(row, txn.snapshot(), &self.registry))
            .ok_or_else(|| DbError::KeyNotVisible(key.to_string()))?;

        let tombstone = visible.tombstoned(txn.id());
        let merged = merge_records(&visible.data, &data);
        let fresh = VersionedRow::inserted(key.to_string(), merged, txn.id());

        txn.add_write(key, tombstone);
        txn.add_write(key, fresh);
        tracing::debug!("buffered update");
        Ok(())
    }

    /// Buffer a delete on `txn`: a tombstone carrying the visible version's
    /// original `xmin`, so GC bounds remain meaningful.
    #[tracing::instrument(skip(self, txn), fields(txn = %txn.id(), key = %key))]
    pub fn delete(&mut self, txn: &mut Transaction, key: &str) -> Result<()> {
        if !txn.state().is_active() {
            return Err(DbError::TransactionNotActive(txn.id()));
        }

        let versions = self.effective_versions(txn, key);
        if versions.is_empty() {
            return Err(DbError::KeyNotFound(key.to_string()));
        }

        let visible = versions
            .iter()
            .find(|row| self.visibility.is_visible(row, txn.snapshot(), &self.registry))
            .ok_or_else(|| DbError::KeyNotVisible(key.to_string()))?;

        let tombstone = visible.tombstoned(txn.id());
        txn.add_write(key, tombstone);
        tracing::debug!("buffered delete");
        Ok(())
    }

    /// Read every key in `keys` (defaulting to every key the store has ever
    /// seen, plus any key `txn` has written but not yet committed) as
    /// visible to `txn`'s snapshot, flattened to `{ key, ...data }`. Return
    /// order follows `keys`' input order; keys with no visible version are
    /// simply absent from the result.
    pub fn select(&mut self, txn: &mut Transaction, keys: Option<&[String]>) -> Vec<Record> {
        let owned_keys;
        let keys: &[String] = match keys {
            Some(keys) => keys,
            None => {
                let mut all = self.store.all_keys();
                for key in txn.writes().keys() {
                    if !all.contains(key) {
                        all.push(key.clone());
                    }
                }
                owned_keys = all;
                &owned_keys
            }
        };

        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            txn.add_read(key.clone());
            let versions = self.effective_versions(txn, key);
            if let Some(row) = versions
                .iter()
                .find(|row| self.visibility.is_visible(row, txn.snapshot(), &self.registry))
            {
                out.push(row.to_selected_record());
            }
        }
        out
    }

    /// Run the conflict detector; on success apply the write buffer to the
    /// row store, mark `txn` committed, retire it from the active table,
    /// and run a GC pass. On conflict, auto-abort `txn` and surface the
    /// conflict.
    #[tracing::instrument(skip(self, txn), fields(txn = %txn.id()))]
    pub fn commit(&mut self, mut txn: Transaction) -> Result<()> {
        if let Some(reason) = self.conflicts.detect(&txn, &self.store, &self.registry) {
            tracing::warn!(%reason, "commit conflict, auto-aborting");
            self.abort(txn);
            return Err(reason);
        }

        for (_key, rows) in txn.writes().iter() {
            for row in rows {
                self.store.append(row.clone());
            }
        }

        self.registry.mark_committed(txn.id());
        self.txn_manager.commit(&txn);
        txn.mark_committed();
        tracing::debug!("committed");

        self.garbage_collect();
        Ok(())
    }

    /// Mark `txn` aborted and retire it from the active table. The write
    /// buffer was never applied to the store, so there is nothing to undo.
    #[tracing::instrument(skip(self, txn), fields(txn = %txn.id()))]
    pub fn abort(&mut self, mut txn: Transaction) {
        self.registry.mark_aborted(txn.id());
        self.txn_manager.abort(&txn);
        txn.mark_aborted();
        tracing::debug!("aborted");
    }

    /// Sweep every key's version list for versions beneath the global GC
    /// horizon. Safe to call at any time; run automatically after every
    /// successful commit.
    pub fn garbage_collect(&mut self) -> usize {
        let oldest_xmin = self.txn_manager.global_oldest_xmin();
        let dropped = self.store.garbage_collect(oldest_xmin, &self.visibility);
        if dropped > 0 {
            tracing::debug!(dropped, %oldest_xmin, "garbage collected dead versions");
        }
        dropped
    }

    /// Observational accessors for exercising the kernel's subsystems
    /// independently of the full begin/insert/.../commit flow.
    pub fn txn_manager(&self) -> &TransactionManager {
        &self.txn_manager
    }

    pub fn registry(&self) -> &CommitRegistry {
        &self.registry
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }
}
