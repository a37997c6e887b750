/// Quantified invariants T1-T8
///
/// Black-box tests pinning the eight quantified snapshot-isolation
/// invariants, driven through `mvcc_kernel`'s public surface.
/// Run with: cargo test --test invariant_tests

use mvcc_kernel::{Database, VersionedRow, VisibilityEngine};
use serde_json::json;

fn record(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().unwrap().clone()
}

/// T1: TIDs begun in program order are strictly increasing.
#[test]
fn t1_tid_monotonicity() {
    let mut db = Database::new();
    let a = db.begin();
    let b = db.begin();
    let c = db.begin();
    assert!(a.id().as_u64() < b.id().as_u64());
    assert!(b.id().as_u64() < c.id().as_u64());
}

/// T2: a transaction never appears in its own snapshot's active set.
#[test]
fn t2_self_exclusion_in_snapshot() {
    let mut db = Database::new();
    let _t1 = db.begin();
    let t2 = db.begin();
    let t3 = db.begin();
    assert!(!t2.snapshot().active.contains(&t2.id()));
    assert!(!t3.snapshot().active.contains(&t3.id()));
}

/// T3: a snapshot's active set is exactly the transactions still in
/// progress at the instant of BEGIN, excluding self.
#[test]
fn t3_snapshot_correctness() {
    let mut db = Database::new();
    let t1 = db.begin();
    let t2 = db.begin();
    let t3 = db.begin();

    // At t3's BEGIN, t1 and t2 are both still in progress.
    assert!(t3.snapshot().active.contains(&t1.id()));
    assert!(t3.snapshot().active.contains(&t2.id()));
    assert_eq!(t3.snapshot().active.len(), 2);

    db.commit(t1).unwrap();
    let t4 = db.begin();
    // t1 has since committed, t2 is still active: only t2 should show up.
    assert!(!t4.snapshot().active.contains(&t4.id()));
    assert!(t4.snapshot().active.contains(&t2.id()));

    db.commit(t2).unwrap();
    db.commit(t3).unwrap();
    db.commit(t4).unwrap();
}

/// T4: repeated reads within the same transaction agree, as long as no
/// version authored by that transaction itself is added in between.
#[test]
fn t4_visibility_stability() {
    let mut db = Database::new();
    let mut seed = db.begin();
    db.insert(&mut seed, "user_1", record(json!({"age": 25})));
    db.commit(seed).unwrap();

    let mut reader = db.begin();
    let first = db.select(&mut reader, Some(&["user_1".to_string()]));
    let second = db.select(&mut reader, Some(&["user_1".to_string()]));
    assert_eq!(first, second);
    db.commit(reader).unwrap();
}

/// T5: a transaction sees its own uncommitted insert.
#[test]
fn t5_own_writes() {
    let mut db = Database::new();
    let mut t1 = db.begin();
    db.insert(&mut t1, "user_1", record(json!({"name": "Alice"})));

    let rows = db.select(&mut t1, Some(&["user_1".to_string()]));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["key"], "user_1");
    assert_eq!(rows[0]["name"], "Alice");
    db.commit(t1).unwrap();
}

/// T6: after a transaction aborts, its inserts never become visible to
/// any later transaction.
#[test]
fn t6_abort_invisibility() {
    let mut db = Database::new();
    let mut t1 = db.begin();
    db.insert(&mut t1, "user_1", record(json!({"name": "Alice"})));
    db.abort(t1);

    let mut later = db.begin();
    assert!(db.select(&mut later, Some(&["user_1".to_string()])).is_empty());
}

/// T7: of two concurrent transactions updating the same visible key,
/// whichever commits first wins; the other raises WriteWriteConflict.
#[test]
fn t7_first_committer_wins() {
    let mut db = Database::new();
    let mut seed = db.begin();
    db.insert(&mut seed, "user_1", record(json!({"age": 25})));
    db.commit(seed).unwrap();

    let mut t1 = db.begin();
    let mut t2 = db.begin();
    db.update(&mut t1, "user_1", record(json!({"age": 26}))).unwrap();
    db.update(&mut t2, "user_1", record(json!({"age": 27}))).unwrap();

    assert!(db.commit(t1).is_ok());
    let err = db.commit(t2).unwrap_err();
    assert!(err.to_string().contains("Write-write conflict"));
}

/// T8: can_collect is false whenever the row is undeleted, or its xmin
/// or xmax has not yet fallen beneath the horizon.
///
/// TIDs are obtained from real `Database::begin()` calls (there is no
/// public raw constructor), so `creator < deleter < later` by construction.
#[test]
fn t8_gc_soundness() {
    let engine = VisibilityEngine::new();
    let mut db = Database::new();

    let creator = db.begin(); // will be the row's xmin
    let deleter = db.begin(); // will be the row's xmax
    let later = db.begin(); // strictly past both

    let undeleted = VersionedRow::inserted("k", Default::default(), creator.id());
    assert!(!engine.can_collect(&undeleted, later.id()));

    let tombstoned = undeleted.tombstoned(deleter.id());
    assert!(
        !engine.can_collect(&tombstoned, creator.id()),
        "xmin is not strictly below a horizon equal to itself"
    );
    assert!(
        !engine.can_collect(&tombstoned, deleter.id()),
        "xmax is not strictly below a horizon equal to itself"
    );
    assert!(engine.can_collect(&tombstoned, later.id()));

    db.abort(later);
}
