// ============================================================================
// MVCC Kernel
// ============================================================================
//
// A single-node, in-memory multi-version concurrency control engine
// implementing snapshot isolation over a keyed row store.
//
// Concurrent writers to overlapping keys are resolved by first-committer-
// wins; prior row versions are retained until no live snapshot can observe
// them, then garbage-collected.
//
// ============================================================================

pub mod commit_registry;
pub mod conflict;
pub mod core;
pub mod engine;
pub mod storage;
pub mod transaction;
pub mod visibility;

pub use commit_registry::CommitRegistry;
pub use conflict::ConflictDetector;
pub use core::{DbError, Record, Result, Snapshot, VersionedRow};
pub use engine::Database;
pub use storage::RowStore;
pub use transaction::{Transaction, TransactionId, TransactionManager, TransactionState};
pub use visibility::VisibilityEngine;
