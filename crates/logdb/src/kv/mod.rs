//! Key-value engines
//!
//! The log store is written against [`KvStore`] so the engine underneath can
//! be swapped. Two engines ship here:
//!
//! - [`FileKvStore`]: an append-only log file replayed into an in-memory index
//! - [`MemKvStore`]: memory only, for tests and ephemeral replicas

mod file;
mod memory;

pub use file::{FileKvStore, KV_LOG_FILE};
pub use memory::MemKvStore;

use crate::config::LogDbConfig;
use crate::error::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// One mutation inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Set `key` to `value`
    Put {
        /// Key
        key: Vec<u8>,
        /// Value
        value: Vec<u8>,
    },
    /// Remove `key`
    Delete {
        /// Key
        key: Vec<u8>,
    },
    /// Remove every key in `[start, end)`
    DeleteRange {
        /// First key removed
        start: Vec<u8>,
        /// First key kept
        end: Vec<u8>,
    },
}

/// Mutations applied atomically, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a put
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(WriteOp::Put { key, value });
    }

    /// Queue a delete
    pub fn delete(&mut self, key: Vec<u8>) {
        self.ops.push(WriteOp::Delete { key });
    }

    /// Queue a range delete over `[start, end)`
    pub fn delete_range(&mut self, start: Vec<u8>, end: Vec<u8>) {
        self.ops.push(WriteOp::DeleteRange { start, end });
    }

    /// Number of queued mutations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Queued mutations in order
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub(crate) fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Ordered key-value engine
///
/// Implementations must be safe to share between threads. A `write` is
/// all-or-nothing with respect to readers and crash recovery.
pub trait KvStore: Send + Sync {
    /// Engine name, for logs
    fn name(&self) -> &'static str;

    /// Point lookup
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// All pairs with `start <= key < end`, in key order
    fn scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Apply a batch atomically
    fn write(&self, batch: WriteBatch) -> Result<()>;
}

/// Opens one engine rooted at a directory
pub type KvStoreFactory = fn(&Path, &LogDbConfig) -> Result<Box<dyn KvStore>>;

/// Factory for [`FileKvStore`]
pub fn file_factory(dir: &Path, config: &LogDbConfig) -> Result<Box<dyn KvStore>> {
    Ok(Box::new(FileKvStore::open(dir, config.sync_writes)?))
}

/// Factory for [`MemKvStore`]; the directory is ignored
pub fn memory_factory(_dir: &Path, _config: &LogDbConfig) -> Result<Box<dyn KvStore>> {
    Ok(Box::new(MemKvStore::new()))
}

/// Apply one mutation to an ordered map
pub(crate) fn apply_op(map: &mut BTreeMap<Vec<u8>, Vec<u8>>, op: WriteOp) {
    match op {
        WriteOp::Put { key, value } => {
            map.insert(key, value);
        }
        WriteOp::Delete { key } => {
            map.remove(&key);
        }
        WriteOp::DeleteRange { start, end } => {
            if start >= end {
                return;
            }
            let mut tail = map.split_off(&start);
            let mut kept = tail.split_off(&end);
            map.append(&mut kept);
        }
    }
}

/// Range scan over an ordered map
pub(crate) fn scan_map(
    map: &BTreeMap<Vec<u8>, Vec<u8>>,
    start: &[u8],
    end: &[u8],
) -> Vec<(Vec<u8>, Vec<u8>)> {
    if start >= end {
        return Vec::new();
    }
    map.range::<[u8], _>((
        std::ops::Bound::Included(start),
        std::ops::Bound::Excluded(end),
    ))
    .map(|(k, v)| (k.clone(), v.clone()))
    .collect()
}
