//! Replicated log store
//!
//! Persists raft-style log entries and the latest snapshot header of each
//! replica on top of one or more [`KvStore`] engines. Shards are spread
//! across engines by `shard % engines`.
//!
//! Two entry layouts are supported:
//!
//! - **Plain**: one key per entry
//! - **Batched**: entries grouped into [`EntryBatch`] values of `batch_size`
//!   consecutive indexes, keyed by `index / batch_size`
//!
//! Writes for a given replica must be serialized by the caller; batched
//! writes read-modify-write the affected batches.

use crate::config::{EntryStorage, LogDbConfig};
use crate::error::Result;
use crate::keys::{batch_key, entry_key, key_id, snapshot_key};
use crate::kv::{KvStore, KvStoreFactory, WriteBatch};
use snapwire_proto::{Entry, EntryBatch, Message, SnapshotHeader};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Log store over a set of key-value engines
pub struct LogDb {
    config: LogDbConfig,
    engines: Vec<Box<dyn KvStore>>,
}

impl std::fmt::Debug for LogDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogDb")
            .field("name", &self.name())
            .field("config", &self.config)
            .finish()
    }
}

impl LogDb {
    /// Open one engine per configured directory
    pub fn open(config: LogDbConfig, factory: KvStoreFactory) -> Result<Self> {
        config.validate()?;
        let engines = config
            .dirs
            .iter()
            .map(|dir| factory(dir, &config))
            .collect::<Result<Vec<_>>>()?;

        let db = LogDb { config, engines };
        debug!(
            name = %db.name(),
            engines = db.engines.len(),
            batch_size = db.config.batch_size,
            "Opened log db"
        );
        Ok(db)
    }

    /// Store name, e.g. `file-batched`
    pub fn name(&self) -> String {
        let engine = self.engines.first().map_or("none", |e| e.name());
        format!("{}-{}", engine, self.config.entry_storage.name())
    }

    /// Active configuration
    pub fn config(&self) -> &LogDbConfig {
        &self.config
    }

    /// True when entries are stored in batches
    pub fn is_batched(&self) -> bool {
        self.config.entry_storage == EntryStorage::Batched
    }

    fn engine(&self, shard: u64) -> &dyn KvStore {
        // validate() guarantees at least one engine
        let slot = (shard % self.engines.len() as u64) as usize;
        self.engines[slot].as_ref()
    }

    /// Persist entries, replacing any already stored at the same indexes
    pub fn save_entries(&self, shard: u64, replica: u64, entries: &[Entry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let engine = self.engine(shard);
        let mut batch = WriteBatch::new();

        match self.config.entry_storage {
            EntryStorage::Plain => {
                for entry in entries {
                    batch.put(entry_key(shard, replica, entry.index), entry.encode());
                }
            }
            EntryStorage::Batched => {
                let size = self.config.batch_size;
                let mut grouped: BTreeMap<u64, Vec<&Entry>> = BTreeMap::new();
                for entry in entries {
                    grouped.entry(entry.index / size).or_default().push(entry);
                }
                for (batch_id, group) in grouped {
                    let key = batch_key(shard, replica, batch_id);
                    let mut merged = self.load_batch(engine, &key)?;
                    for entry in group {
                        merged.insert(entry.index, entry.clone());
                    }
                    let value = EntryBatch {
                        entries: merged.into_values().collect(),
                    };
                    batch.put(key, value.encode());
                }
            }
        }

        trace!(shard, replica, count = entries.len(), "Saving entries");
        engine.write(batch)
    }

    fn load_batch(&self, engine: &dyn KvStore, key: &[u8]) -> Result<BTreeMap<u64, Entry>> {
        let Some(bytes) = engine.get(key)? else {
            return Ok(BTreeMap::new());
        };
        let stored = EntryBatch::decode(&bytes)?;
        Ok(stored.entries.into_iter().map(|e| (e.index, e)).collect())
    }

    /// Entries in `[low, high)`, contiguous from `low`
    ///
    /// Stops at the first missing index. Stops before the entry that would
    /// push the encoded total past `max_bytes`, except that the first entry
    /// is always returned when present.
    pub fn entries(
        &self,
        shard: u64,
        replica: u64,
        low: u64,
        high: u64,
        max_bytes: u64,
    ) -> Result<Vec<Entry>> {
        if low >= high {
            return Ok(Vec::new());
        }
        let engine = self.engine(shard);
        let candidates = match self.config.entry_storage {
            EntryStorage::Plain => self.scan_plain(engine, shard, replica, low, high)?,
            EntryStorage::Batched => self.scan_batched(engine, shard, replica, low, high)?,
        };

        let mut result = Vec::new();
        let mut total = 0u64;
        let mut expected = low;
        for entry in candidates {
            if entry.index != expected {
                break;
            }
            let size = entry.encoded_len() as u64;
            if !result.is_empty() && total.saturating_add(size) > max_bytes {
                break;
            }
            total = total.saturating_add(size);
            result.push(entry);
            expected += 1;
        }
        Ok(result)
    }

    fn scan_plain(
        &self,
        engine: &dyn KvStore,
        shard: u64,
        replica: u64,
        low: u64,
        high: u64,
    ) -> Result<Vec<Entry>> {
        let start = entry_key(shard, replica, low);
        let end = entry_key(shard, replica, high);
        engine
            .scan(&start, &end)?
            .into_iter()
            .map(|(_, value)| Ok(Entry::decode(&value)?))
            .collect()
    }

    fn scan_batched(
        &self,
        engine: &dyn KvStore,
        shard: u64,
        replica: u64,
        low: u64,
        high: u64,
    ) -> Result<Vec<Entry>> {
        let size = self.config.batch_size;
        let start = batch_key(shard, replica, low / size);
        // high > low so high - 1 never underflows
        let end = batch_key(shard, replica, (high - 1) / size + 1);

        let mut entries = Vec::new();
        for (_, value) in engine.scan(&start, &end)? {
            let batch = EntryBatch::decode(&value)?;
            entries.extend(
                batch
                    .entries
                    .into_iter()
                    .filter(|e| e.index >= low && e.index < high),
            );
        }
        Ok(entries)
    }

    /// Remove every entry with index `<= index`
    pub fn remove_entries_to(&self, shard: u64, replica: u64, index: u64) -> Result<()> {
        let engine = self.engine(shard);
        let mut batch = WriteBatch::new();

        match self.config.entry_storage {
            EntryStorage::Plain => {
                batch.delete_range(
                    entry_key(shard, replica, 0),
                    entry_key(shard, replica, index),
                );
                batch.delete(entry_key(shard, replica, index));
            }
            EntryStorage::Batched => {
                let size = self.config.batch_size;
                // Batches below `first_partial` hold only indexes <= index
                let first_partial = index.saturating_add(1) / size;
                batch.delete_range(
                    batch_key(shard, replica, 0),
                    batch_key(shard, replica, first_partial),
                );

                let last_touched = index / size;
                if last_touched >= first_partial {
                    let key = batch_key(shard, replica, last_touched);
                    let mut kept = self.load_batch(engine, &key)?;
                    kept.retain(|&i, _| i > index);
                    if kept.is_empty() {
                        batch.delete(key);
                    } else {
                        let value = EntryBatch {
                            entries: kept.into_values().collect(),
                        };
                        batch.put(key, value.encode());
                    }
                }
            }
        }

        debug!(shard, replica, index, "Removing entries");
        engine.write(batch)
    }

    /// Persist the latest snapshot header of a replica
    pub fn save_snapshot(&self, shard: u64, replica: u64, header: &SnapshotHeader) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put(snapshot_key(shard, replica), header.encode());
        self.engine(shard).write(batch)
    }

    /// Latest snapshot header of a replica, if one was saved
    pub fn snapshot(&self, shard: u64, replica: u64) -> Result<Option<SnapshotHeader>> {
        let Some(bytes) = self.engine(shard).get(&snapshot_key(shard, replica))? else {
            return Ok(None);
        };
        Ok(Some(SnapshotHeader::decode(&bytes)?))
    }

    /// Lowest stored entry index of a replica, if any
    pub fn first_index(&self, shard: u64, replica: u64) -> Result<Option<u64>> {
        let engine = self.engine(shard);
        match self.config.entry_storage {
            EntryStorage::Plain => {
                let start = entry_key(shard, replica, 0);
                let end = entry_key(shard, replica, u64::MAX);
                let first = engine.scan(&start, &end)?.into_iter().next();
                match first {
                    Some((key, _)) => Ok(key_id(&key)),
                    None => Ok(engine.get(&end)?.map(|_| u64::MAX)),
                }
            }
            EntryStorage::Batched => {
                let start = batch_key(shard, replica, 0);
                let end = batch_key(shard, replica, u64::MAX);
                let mut found = engine.scan(&start, &end)?;
                if let Some(value) = engine.get(&end)? {
                    found.push((end, value));
                }
                match found.into_iter().next() {
                    Some((_, value)) => {
                        let batch = EntryBatch::decode(&value)?;
                        Ok(batch.entries.first().map(|e| e.index))
                    }
                    None => Ok(None),
                }
            }
        }
    }
}
