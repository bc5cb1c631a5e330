//! Replicated log storage
//!
//! Stores log entries and snapshot headers for many replicas on top of an
//! ordered key-value engine.
//!
//! # Quick start
//!
//! ```no_run
//! use snapwire_logdb::new_log_db;
//! use snapwire_proto::Entry;
//!
//! let db = new_log_db(["/var/lib/node/logdb"])?;
//! db.save_entries(1, 1, &[Entry::new(1, 1, b"cmd".to_vec())])?;
//! let entries = db.entries(1, 1, 1, 2, u64::MAX)?;
//! assert_eq!(entries.len(), 1);
//! # Ok::<(), snapwire_logdb::LogDbError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod keys;
pub mod kv;
pub mod logdb;

pub use config::{EntryStorage, LogDbConfig, LogDbConfigError, DEFAULT_BATCH_SIZE};
pub use error::{LogDbError, Result};
pub use kv::{
    file_factory, memory_factory, FileKvStore, KvStore, KvStoreFactory, MemKvStore, WriteBatch,
    WriteOp, KV_LOG_FILE,
};
pub use logdb::LogDb;

use std::path::PathBuf;

/// Open a file-backed log store with one entry per key
pub fn new_log_db<I, P>(dirs: I) -> Result<LogDb>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    LogDb::open(LogDbConfig::new(dirs), file_factory)
}

/// Open a file-backed log store with batched entries
pub fn new_batched_log_db<I, P>(dirs: I) -> Result<LogDb>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    LogDb::open(LogDbConfig::new(dirs).batched(), file_factory)
}
