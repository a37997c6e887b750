use crate::core::{Snapshot, VersionedRow};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Unique identifier for a transaction: a positive integer drawn from a
/// strictly monotone counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        TransactionId(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

/// Transaction state following the state pattern:
///
/// ```text
/// Active ──commit (no conflict)──▶ Committed
///   │
///   └──abort / commit (conflict)─▶ Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

impl TransactionState {
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::Active)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Active => write!(f, "ACTIVE"),
            TransactionState::Committed => write!(f, "COMMITTED"),
            TransactionState::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// A single transaction: its identity, its frozen read snapshot, and the
/// versions it has written but not yet committed.
///
/// Writes accumulate per key in arrival order — an UPDATE appends a
/// tombstone of the prior visible version followed by the new version, and
/// both must survive in that order until commit applies them to the row
/// store. A container that enforces per-key uniqueness here would be wrong.
#[derive(Debug)]
pub struct Transaction {
    id: TransactionId,
    state: TransactionState,
    snapshot: Snapshot,
    writes: HashMap<String, Vec<VersionedRow>>,
    reads: HashSet<String>,
    start_time: std::time::Instant,
}

impl Transaction {
    pub(crate) fn new(id: TransactionId, snapshot: Snapshot) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            snapshot,
            writes: HashMap::new(),
            reads: HashSet::new(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn writes(&self) -> &HashMap<String, Vec<VersionedRow>> {
        &self.writes
    }

    pub fn reads(&self) -> &HashSet<String> {
        &self.reads
    }

    /// Elapsed wall-clock time since BEGIN; diagnostics only, never consulted
    /// by kernel logic.
    pub fn duration(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Record a key as having been read; informational only.
    pub(crate) fn add_read(&mut self, key: impl Into<String>) {
        self.reads.insert(key.into());
    }

    /// Append a pending write for `key`, preserving arrival order.
    pub(crate) fn add_write(&mut self, key: impl Into<String>, row: VersionedRow) {
        self.writes.entry(key.into()).or_default().push(row);
    }

    pub(crate) fn mark_committed(&mut self) {
        self.state = TransactionState::Committed;
    }

    pub(crate) fn mark_aborted(&mut self) {
        self.state = TransactionState::Aborted;
        self.writes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as StdHashSet;
    use std::sync::Arc;

    fn txn(id: u64) -> Transaction {
        let snapshot = Snapshot::new(TransactionId::from_raw(id), Arc::new(StdHashSet::new()));
        Transaction::new(TransactionId::from_raw(id), snapshot)
    }

    #[test]
    fn starts_active() {
        let t = txn(1);
        assert!(t.state().is_active());
    }

    #[test]
    fn writes_for_a_key_preserve_arrival_order() {
        use crate::core::Record;

        let mut t = txn(1);
        let tombstone = VersionedRow {
            key: "user_1".into(),
            data: Record::new(),
            xmin: TransactionId::from_raw(0),
            xmax: Some(TransactionId::from_raw(1)),
        };
        let fresh = VersionedRow::inserted("user_1", Record::new(), TransactionId::from_raw(1));
        t.add_write("user_1", tombstone.clone());
        t.add_write("user_1", fresh.clone());

        let writes = &t.writes()["user_1"];
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].xmax, tombstone.xmax);
        assert_eq!(writes[1].xmax, fresh.xmax);
    }

    #[test]
    fn abort_clears_writes() {
        let mut t = txn(1);
        t.add_write("k", VersionedRow::inserted("k", crate::core::Record::new(), TransactionId::from_raw(1)));
        t.mark_aborted();
        assert!(t.writes().is_empty());
        assert_eq!(t.state(), TransactionState::Aborted);
    }
}
