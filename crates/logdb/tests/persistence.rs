//! Log store persistence across reopen
//!
//! These tests verify:
//! - Entries and snapshot headers survive a close/reopen on the file engine
//! - Both entry layouts behave identically after reopen
//! - Compaction (remove_entries_to) is durable
//! - Shards spread over several directories stay separate

use proptest::prelude::*;
use snapwire_logdb::{
    file_factory, new_batched_log_db, new_log_db, LogDb, LogDbConfig, KV_LOG_FILE,
};
use snapwire_proto::{Entry, SnapshotHeader};
use tempfile::TempDir;

fn entries(range: std::ops::RangeInclusive<u64>) -> Vec<Entry> {
    range
        .map(|i| Entry::new(i / 10 + 1, i, format!("payload {}", i).into_bytes()))
        .collect()
}

fn reopen(dir: &TempDir, batched: bool) -> LogDb {
    let config = LogDbConfig::for_testing([dir.path()]);
    let config = if batched { config.batched() } else { config };
    LogDb::open(config, file_factory).unwrap()
}

#[test]
fn entries_survive_reopen() {
    for batched in [false, true] {
        let dir = TempDir::new().unwrap();
        let saved = entries(1..=25);
        {
            let db = reopen(&dir, batched);
            db.save_entries(7, 2, &saved).unwrap();
        }
        let db = reopen(&dir, batched);
        assert_eq!(db.entries(7, 2, 1, 26, u64::MAX).unwrap(), saved);
    }
}

#[test]
fn compaction_survives_reopen() {
    for batched in [false, true] {
        let dir = TempDir::new().unwrap();
        {
            let db = reopen(&dir, batched);
            db.save_entries(1, 1, &entries(1..=20)).unwrap();
            db.remove_entries_to(1, 1, 13).unwrap();
        }
        let db = reopen(&dir, batched);
        assert!(db.entries(1, 1, 1, 21, u64::MAX).unwrap().is_empty());
        assert_eq!(db.first_index(1, 1).unwrap(), Some(14));
        assert_eq!(db.entries(1, 1, 14, 21, u64::MAX).unwrap(), entries(14..=20));
    }
}

#[test]
fn snapshot_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let header = SnapshotHeader::new(512, 8192)
        .with_git_version("v2.0.0")
        .seal(b"snapshot payload")
        .unwrap();
    {
        let db = reopen(&dir, false);
        db.save_snapshot(4, 9, &header).unwrap();
    }
    let db = reopen(&dir, false);
    let loaded = db.snapshot(4, 9).unwrap().unwrap();
    assert_eq!(loaded, header);
    loaded.verify_header().unwrap();
    loaded.verify_payload(b"snapshot payload").unwrap();
}

#[test]
fn shards_spread_over_directories() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let db = new_log_db([a.path(), b.path()]).unwrap();
    assert_eq!(db.name(), "file-plain");

    db.save_entries(0, 1, &entries(1..=3)).unwrap();
    db.save_entries(1, 1, &entries(1..=5)).unwrap();

    // Shard 0 went to the first directory, shard 1 to the second
    assert!(a.path().join(KV_LOG_FILE).metadata().unwrap().len() > 0);
    assert!(b.path().join(KV_LOG_FILE).metadata().unwrap().len() > 0);
    assert_eq!(db.entries(0, 1, 1, 10, u64::MAX).unwrap().len(), 3);
    assert_eq!(db.entries(1, 1, 1, 10, u64::MAX).unwrap().len(), 5);
}

#[test]
fn batched_factory_defaults() {
    let dir = TempDir::new().unwrap();
    let db = new_batched_log_db([dir.path()]).unwrap();
    assert_eq!(db.name(), "file-batched");
    assert_eq!(db.config().batch_size, snapwire_logdb::DEFAULT_BATCH_SIZE);
    assert!(db.config().sync_writes);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn layouts_agree(
        count in 1u64..60,
        compact_to in 0u64..70,
        low in 0u64..70,
        span in 0u64..70,
        max_bytes in 0u64..400,
    ) {
        let plain = LogDb::open(
            LogDbConfig::for_testing(["p"]),
            snapwire_logdb::memory_factory,
        ).unwrap();
        let batched = LogDb::open(
            LogDbConfig::for_testing(["b"]).batched(),
            snapwire_logdb::memory_factory,
        ).unwrap();

        let saved = entries(1..=count);
        for db in [&plain, &batched] {
            db.save_entries(1, 1, &saved).unwrap();
            db.remove_entries_to(1, 1, compact_to).unwrap();
        }

        let high = low + span;
        prop_assert_eq!(
            plain.entries(1, 1, low, high, max_bytes).unwrap(),
            batched.entries(1, 1, low, high, max_bytes).unwrap()
        );
        prop_assert_eq!(plain.first_index(1, 1).unwrap(), batched.first_index(1, 1).unwrap());
    }
}
