// ============================================================================
// mvcc-demo
// ============================================================================
//
// A small synchronous CLI that walks the kernel through a few snapshot
// isolation scenarios: seed rows, open concurrent transactions, and print
// what each one observes. Exists to demonstrate the core, not to be a
// database server — no wire protocol, no parser.
//
// ============================================================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mvcc_kernel::Database;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "mvcc-demo")]
#[command(about = "Walks the MVCC kernel through its snapshot-isolation scenarios", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Scenario>,
}

#[derive(Subcommand)]
enum Scenario {
    /// A committed writer's rows become visible to a later reader.
    SnapshotIsolation,
    /// An uncommitted writer's rows stay invisible to a concurrent reader.
    UncommittedInvisibility,
    /// Two concurrent updaters to the same key: first commit wins.
    FirstCommitterWins,
    /// Run every scenario above in sequence.
    All,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Scenario::All) {
        Scenario::SnapshotIsolation => snapshot_isolation()?,
        Scenario::UncommittedInvisibility => uncommitted_invisibility()?,
        Scenario::FirstCommitterWins => first_committer_wins()?,
        Scenario::All => {
            snapshot_isolation()?;
            uncommitted_invisibility()?;
            first_committer_wins()?;
        }
    }

    Ok(())
}

fn record(fields: &[(&str, Value)]) -> Map<String, Value> {
    fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn snapshot_isolation() -> Result<()> {
    println!("--- snapshot isolation after commit ---");
    let mut db = Database::new();

    let mut t1 = db.begin();
    db.insert(&mut t1, "user_1", record(&[("id", 1.into()), ("name", "Alice".into())]));
    db.insert(&mut t1, "user_2", record(&[("id", 2.into()), ("name", "Bob".into())]));
    db.commit(t1).context("seed transaction should not conflict")?;

    let mut t2 = db.begin();
    let rows = db.select(&mut t2, None);
    for row in &rows {
        println!("  visible: {row}");
    }
    db.commit(t2).context("read-only transaction should not conflict")?;
    Ok(())
}

fn uncommitted_invisibility() -> Result<()> {
    println!("--- uncommitted writes stay invisible ---");
    let mut db = Database::new();

    let mut t1 = db.begin();
    db.insert(&mut t1, "user_1", record(&[("id", 1.into())]));

    let mut t2 = db.begin();
    let rows = db.select(&mut t2, None);
    println!("  t2 sees {} row(s) before t1 commits", rows.len());
    db.abort(t1);
    Ok(())
}

fn first_committer_wins() -> Result<()> {
    println!("--- first committer wins ---");
    let mut db = Database::new();

    let mut seed = db.begin();
    db.insert(&mut seed, "user_1", record(&[("id", 1.into()), ("age", 25.into())]));
    db.commit(seed).context("seed transaction should not conflict")?;

    let mut t2 = db.begin();
    let mut t3 = db.begin();
    db.update(&mut t2, "user_1", record(&[("age", 26.into())]))?;
    db.update(&mut t3, "user_1", record(&[("age", 27.into())]))?;

    db.commit(t2).context("first committer should succeed")?;
    match db.commit(t3) {
        Ok(()) => anyhow::bail!("expected the second committer to lose"),
        Err(err) => println!("  second committer rejected: {err}"),
    }
    Ok(())
}
