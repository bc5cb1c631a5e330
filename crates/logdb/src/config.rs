//! Log store configuration
//!
//! Controls where the key-value engines live and how entries are laid out
//! in them.

use std::collections::HashSet;
use std::path::PathBuf;

/// Entries per batch in batched mode (default)
pub const DEFAULT_BATCH_SIZE: u64 = 48;

/// How log entries are laid out in the key-value engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStorage {
    /// One key per entry
    ///
    /// Uses less memory, lower write throughput.
    Plain,

    /// Consecutive entries grouped into one value
    ///
    /// Uses more memory, higher write throughput.
    Batched,
}

impl EntryStorage {
    /// Short name used in store names and logs
    pub fn name(&self) -> &'static str {
        match self {
            EntryStorage::Plain => "plain",
            EntryStorage::Batched => "batched",
        }
    }
}

/// Log store configuration parameters
#[derive(Debug, Clone)]
pub struct LogDbConfig {
    /// One directory per key-value engine; shards are spread across them
    pub dirs: Vec<PathBuf>,

    /// Entry layout (default: Plain)
    pub entry_storage: EntryStorage,

    /// Entries per batch when `entry_storage` is Batched (default: 48)
    pub batch_size: u64,

    /// fsync after every write batch (default: true)
    pub sync_writes: bool,
}

impl Default for LogDbConfig {
    fn default() -> Self {
        LogDbConfig {
            dirs: Vec::new(),
            entry_storage: EntryStorage::Plain,
            batch_size: DEFAULT_BATCH_SIZE,
            sync_writes: true,
        }
    }
}

impl LogDbConfig {
    /// Create a configuration over `dirs` with default values
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        LogDbConfig {
            dirs: dirs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set entry layout (builder pattern)
    pub fn with_entry_storage(mut self, storage: EntryStorage) -> Self {
        self.entry_storage = storage;
        self
    }

    /// Use batched entry layout (builder pattern)
    pub fn batched(self) -> Self {
        self.with_entry_storage(EntryStorage::Batched)
    }

    /// Set batch size (builder pattern)
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size;
        self
    }

    /// Set fsync behaviour (builder pattern)
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), LogDbConfigError> {
        if self.dirs.is_empty() {
            return Err(LogDbConfigError::NoDirectories);
        }
        if self.batch_size == 0 {
            return Err(LogDbConfigError::BatchSizeZero);
        }
        let mut seen = HashSet::new();
        for dir in &self.dirs {
            if !seen.insert(dir) {
                return Err(LogDbConfigError::DuplicateDirectory(dir.clone()));
            }
        }
        Ok(())
    }

    /// Create a configuration for testing (small batches, no fsync)
    pub fn for_testing<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        LogDbConfig {
            batch_size: 4,
            sync_writes: false,
            ..Self::new(dirs)
        }
    }
}

/// Log store configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogDbConfigError {
    /// No storage directory configured
    #[error("At least one storage directory is required")]
    NoDirectories,

    /// Batch size of zero
    #[error("Batch size must be at least 1")]
    BatchSizeZero,

    /// The same directory listed twice
    #[error("Directory listed more than once: {0}")]
    DuplicateDirectory(PathBuf),
}
