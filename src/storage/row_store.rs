// ============================================================================
// Row Store
// ============================================================================
//
// An ordered-by-insertion list of versions per key. Append-only except for
// the tombstone-replace-in-place trick: a commit that deletes or updates a
// visible version must overwrite that version's xmax rather than appending
// a second, duplicate copy of it.
//
// ============================================================================

use crate::core::VersionedRow;
use crate::transaction::TransactionId;
use crate::visibility::VisibilityEngine;
use std::collections::HashMap;

/// Splice `row` into `versions` the way a commit would: if `row` carries an
/// `xmax` (a tombstone copy produced by UPDATE or DELETE), overwrite the
/// live version it supersedes — same `xmin`, still `xmax = None` — in
/// place instead of appending a duplicate. Otherwise just append. Shared
/// between `RowStore::append` and the orchestrator's own-writes overlay, so
/// both see the same "what would the store look like with this write
/// applied" view.
pub(crate) fn splice(versions: &mut Vec<VersionedRow>, row: VersionedRow) {
    if row.xmax.is_some() {
        if let Some(existing) = versions
            .iter_mut()
            .find(|v| v.xmin == row.xmin && v.xmax.is_none())
        {
            *existing = row;
            return;
        }
    }
    versions.push(row);
}

#[derive(Debug, Default)]
pub struct RowStore {
    rows: HashMap<String, Vec<VersionedRow>>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `row` to its key's version list, splicing in place when it
    /// tombstones a version already on record (see `splice` above). An
    /// implementation that only appends would double-count versions and
    /// misreport GC counts.
    pub fn append(&mut self, row: VersionedRow) {
        let versions = self.rows.entry(row.key.clone()).or_default();
        splice(versions, row);
    }

    /// All versions stored under `key`, in insertion order. Empty if the key
    /// has never been written.
    pub fn all_versions(&self, key: &str) -> &[VersionedRow] {
        self.rows.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The most recently appended version under `key`, if any.
    pub fn latest(&self, key: &str) -> Option<&VersionedRow> {
        self.rows.get(key).and_then(|versions| versions.last())
    }

    /// Every key that currently has at least one version on record.
    pub fn all_keys(&self) -> Vec<String> {
        self.rows.keys().cloned().collect()
    }

    /// Drop every version no live snapshot can observe anymore, i.e. every
    /// version for which `visibility.can_collect(row, oldest_xmin)` holds.
    /// Keys left with no versions are removed entirely. Returns the total
    /// number of versions dropped.
    pub fn garbage_collect(&mut self, oldest_xmin: TransactionId, visibility: &VisibilityEngine) -> usize {
        let mut dropped = 0usize;
        self.rows.retain(|_key, versions| {
            let before = versions.len();
            versions.retain(|row| !visibility.can_collect(row, oldest_xmin));
            dropped += before - versions.len();
            !versions.is_empty()
        });
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;

    fn tid(n: u64) -> TransactionId {
        TransactionId::from_raw(n)
    }

    fn inserted(key: &str, xmin: u64) -> VersionedRow {
        VersionedRow::inserted(key, Record::new(), tid(xmin))
    }

    #[test]
    fn append_adds_a_fresh_key() {
        let mut store = RowStore::new();
        store.append(inserted("k", 1));
        assert_eq!(store.all_versions("k").len(), 1);
    }

    #[test]
    fn append_replaces_the_live_version_in_place_when_tombstoned() {
        let mut store = RowStore::new();
        store.append(inserted("k", 1));
        let tombstone = store.all_versions("k")[0].tombstoned(tid(2));
        store.append(tombstone);

        let versions = store.all_versions("k");
        assert_eq!(versions.len(), 1, "tombstoning must not double the version count");
        assert_eq!(versions[0].xmax, Some(tid(2)));
    }

    #[test]
    fn append_after_tombstone_adds_a_second_distinct_version() {
        let mut store = RowStore::new();
        store.append(inserted("k", 1));
        let tombstone = store.all_versions("k")[0].tombstoned(tid(2));
        store.append(tombstone);
        store.append(inserted("k", 2));

        assert_eq!(store.all_versions("k").len(), 2);
    }

    #[test]
    fn latest_is_the_last_appended_entry() {
        let mut store = RowStore::new();
        store.append(inserted("k", 1));
        let tombstone = store.all_versions("k")[0].tombstoned(tid(2));
        store.append(tombstone);
        store.append(inserted("k", 2));

        assert_eq!(store.latest("k").unwrap().xmin, tid(2));
    }

    #[test]
    fn latest_on_unknown_key_is_none() {
        let store = RowStore::new();
        assert!(store.latest("missing").is_none());
    }

    #[test]
    fn all_keys_lists_every_key_with_at_least_one_version() {
        let mut store = RowStore::new();
        store.append(inserted("a", 1));
        store.append(inserted("b", 2));
        let mut keys = store.all_keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn garbage_collect_drops_collectible_versions_and_empties_keys() {
        let mut store = RowStore::new();
        store.append(inserted("k", 1));
        let tombstone = store.all_versions("k")[0].tombstoned(tid(2));
        store.append(tombstone);
        store.append(inserted("k", 2));

        let visibility = VisibilityEngine::new();
        let dropped = store.garbage_collect(tid(100), &visibility);

        assert_eq!(dropped, 1, "only the fully-dead xmin=1/xmax=2 version is collectible");
        assert_eq!(store.all_versions("k").len(), 1);
    }

    #[test]
    fn garbage_collect_removes_keys_left_with_no_versions() {
        let mut store = RowStore::new();
        store.append(inserted("k", 1));
        let tombstone = store.all_versions("k")[0].tombstoned(tid(2));
        store.append(tombstone);

        let visibility = VisibilityEngine::new();
        store.garbage_collect(tid(100), &visibility);

        assert!(store.all_keys().is_empty());
    }

    #[test]
    fn garbage_collect_keeps_versions_below_xmax_but_not_beneath_the_horizon() {
        let mut store = RowStore::new();
        store.append(inserted("k", 1));
        let tombstone = store.all_versions("k")[0].tombstoned(tid(50));
        store.append(tombstone);

        let visibility = VisibilityEngine::new();
        let dropped = store.garbage_collect(tid(10), &visibility);

        assert_eq!(dropped, 0, "deleter tid 50 is not yet beneath horizon 10");
        assert_eq!(store.all_versions("k").len(), 1);
    }
}
