// ============================================================================
// Transaction Management
// ============================================================================
//
// Implements snapshot-isolated transactions over the row store:
// - TransactionManager allocates monotone ids and builds snapshots
// - Transaction holds a snapshot, a per-key write buffer, and a read set
//
// Design Patterns Used:
// - State Pattern: transaction lifecycle (Active, Committed, Aborted)
// - Copy-on-write: the active set handed to a new snapshot
//
// ============================================================================

pub mod manager;
pub mod object;

pub use manager::TransactionManager;
pub use object::{Transaction, TransactionId, TransactionState};
