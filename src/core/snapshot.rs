use crate::transaction::TransactionId;
use std::collections::HashSet;
use std::sync::Arc;

/// An immutable, frozen view of the transaction universe at the instant a
/// transaction began.
///
/// `active` is kept behind an `Arc` so that handing the transaction
/// manager's current live set to a freshly begun transaction is an O(1)
/// pointer clone rather than a deep copy of a set that can grow with
/// concurrency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Smallest TID this snapshot can observe as committed; the GC horizon
    /// contribution of this transaction.
    pub xmin: TransactionId,

    /// The TID assigned to the transaction that owns this snapshot at BEGIN.
    pub xmax: TransactionId,

    /// TIDs strictly less than `xmax` that were still in progress at BEGIN.
    pub active: Arc<HashSet<TransactionId>>,

    /// This transaction's own id. Always equal to `xmax`.
    pub my_txn_id: TransactionId,
}

impl Snapshot {
    /// Construct a snapshot from its defining quantities, computing `xmin`
    /// from the active set: the smallest active TID, or `xmax` itself when
    /// no transaction was in progress at BEGIN.
    pub fn new(xmax: TransactionId, active: Arc<HashSet<TransactionId>>) -> Self {
        let xmin = active.iter().min().copied().unwrap_or(xmax);
        Self {
            xmin,
            xmax,
            active,
            my_txn_id: xmax,
        }
    }
}
