//! In-memory engine

use super::{apply_op, scan_map, KvStore, WriteBatch};
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Key-value engine backed by a `BTreeMap`
///
/// Nothing survives a drop.
#[derive(Debug, Default)]
pub struct MemKvStore {
    map: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// True if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl KvStore for MemKvStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(scan_map(&self.map.read(), start, end))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut map = self.map.write();
        for op in batch.into_ops() {
            apply_op(&mut map, op);
        }
        Ok(())
    }
}
