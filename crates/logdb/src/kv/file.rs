//! Append-only file engine
//!
//! Every [`WriteBatch`] becomes one frame appended to `kv.log`:
//!
//! ```text
//! [payload_len: u32 LE][crc32(payload): u32 LE][payload: KvBatch]
//! ```
//!
//! On open the file is replayed front to back into an in-memory index. A
//! partial frame or a CRC mismatch marks the end of valid data: the tail is
//! cut off and a warning logged. A frame whose CRC is valid but whose payload
//! does not decode is reported as corruption.
//!
//! A failed append is rolled back to the last complete frame before the
//! error is returned. If the rollback fails too, the store refuses further
//! writes until it is reopened.
//!
//! The log is never compacted: deletes and range deletes append tombstone
//! frames, so file size and replay time grow with total write volume rather
//! than with live data.

use super::{apply_op, scan_map, KvStore, WriteBatch, WriteOp};
use crate::error::{LogDbError, Result};
use parking_lot::{Mutex, RwLock};
use snapwire_codec::{decode_nested, Field, FieldKind, Message};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Name of the log file inside an engine directory
pub const KV_LOG_FILE: &str = "kv.log";

const FRAME_HEADER_SIZE: usize = 8;

const OP_PUT: u64 = 1;
const OP_DELETE: u64 = 2;
const OP_DELETE_RANGE: u64 = 3;

/// Persisted form of one [`WriteOp`]
///
/// `value` holds the value of a put or the end key of a range delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct KvRecord {
    op: u64,
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Message for KvRecord {
    const NAME: &'static str = "KvRecord";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            number: 1,
            name: "op",
            kind: FieldKind::Varint {
                get: |m| m.op,
                set: |m, v| m.op = v,
            },
        },
        Field {
            number: 2,
            name: "key",
            kind: FieldKind::Bytes {
                get: |m| Some(m.key.as_slice()),
                set: |m, v| m.key = v,
            },
        },
        Field {
            number: 3,
            name: "value",
            kind: FieldKind::Bytes {
                get: |m| (!m.value.is_empty()).then_some(m.value.as_slice()),
                set: |m, v| m.value = v,
            },
        },
    ];
}

impl From<WriteOp> for KvRecord {
    fn from(op: WriteOp) -> Self {
        match op {
            WriteOp::Put { key, value } => KvRecord {
                op: OP_PUT,
                key,
                value,
            },
            WriteOp::Delete { key } => KvRecord {
                op: OP_DELETE,
                key,
                value: Vec::new(),
            },
            WriteOp::DeleteRange { start, end } => KvRecord {
                op: OP_DELETE_RANGE,
                key: start,
                value: end,
            },
        }
    }
}

impl KvRecord {
    fn into_op(self) -> Option<WriteOp> {
        match self.op {
            OP_PUT => Some(WriteOp::Put {
                key: self.key,
                value: self.value,
            }),
            OP_DELETE => Some(WriteOp::Delete { key: self.key }),
            OP_DELETE_RANGE => Some(WriteOp::DeleteRange {
                start: self.key,
                end: self.value,
            }),
            _ => None,
        }
    }
}

/// Persisted form of one [`WriteBatch`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct KvBatch {
    records: Vec<KvRecord>,
}

impl Message for KvBatch {
    const NAME: &'static str = "KvBatch";
    const FIELDS: &'static [Field<Self>] = &[Field {
        number: 1,
        name: "records",
        kind: FieldKind::Messages {
            count: |m| m.records.len(),
            get: |m, i| &m.records[i],
            push: |m, body| decode_nested(body, &mut m.records),
        },
    }];
}

/// Append target of the log
trait LogSink {
    /// Append a whole frame, optionally syncing it
    fn append(&mut self, frame: &[u8], sync: bool) -> io::Result<()>;

    /// Cut the log back to `len` bytes and continue appending from there
    fn rollback(&mut self, len: u64) -> io::Result<()>;
}

impl LogSink for File {
    fn append(&mut self, frame: &[u8], sync: bool) -> io::Result<()> {
        self.write_all(frame)?;
        if sync {
            self.sync_data()?;
        }
        Ok(())
    }

    fn rollback(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.seek(SeekFrom::Start(len))?;
        Ok(())
    }
}

/// Write end of the log: the sink plus the offset just past the last complete frame
struct LogTail<S> {
    sink: S,
    end: u64,
    poisoned: bool,
}

impl<S: LogSink> LogTail<S> {
    fn new(sink: S, end: u64) -> Self {
        LogTail {
            sink,
            end,
            poisoned: false,
        }
    }

    /// Append one frame; on failure the log is left ending at the previous frame
    fn append(&mut self, frame: &[u8], sync: bool) -> Result<()> {
        if self.poisoned {
            return Err(LogDbError::Poisoned { offset: self.end });
        }
        if let Err(err) = self.sink.append(frame, sync) {
            match self.sink.rollback(self.end) {
                Ok(()) => warn!(offset = self.end, error = %err, "Rolled back failed kv log append"),
                Err(rollback) => {
                    self.poisoned = true;
                    warn!(
                        offset = self.end,
                        error = %err,
                        rollback_error = %rollback,
                        "Kv log rollback failed, refusing further writes"
                    );
                }
            }
            return Err(err.into());
        }
        self.end += frame.len() as u64;
        Ok(())
    }
}

/// Key-value engine persisted as an append-only log
pub struct FileKvStore {
    path: PathBuf,
    tail: Mutex<LogTail<File>>,
    index: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    sync_writes: bool,
}

impl std::fmt::Debug for FileKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKvStore")
            .field("path", &self.path)
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}

impl FileKvStore {
    /// Open (or create) the engine in `dir`, replaying any existing log
    pub fn open(dir: &Path, sync_writes: bool) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(KV_LOG_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let mut index = BTreeMap::new();
        let (valid_end, frames) = replay(&buffer, &mut index)?;

        if valid_end < buffer.len() {
            warn!(
                path = %path.display(),
                valid_end,
                file_len = buffer.len(),
                "Truncating torn tail of kv log"
            );
            file.set_len(valid_end as u64)?;
            file.sync_all()?;
        }
        file.seek(SeekFrom::Start(valid_end as u64))?;

        debug!(
            path = %path.display(),
            frames,
            keys = index.len(),
            "Opened file kv store"
        );

        Ok(FileKvStore {
            path,
            tail: Mutex::new(LogTail::new(file, valid_end as u64)),
            index: RwLock::new(index),
            sync_writes,
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Apply every valid frame in `buffer`; returns (end of valid data, frames applied)
fn replay(buffer: &[u8], index: &mut BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(usize, usize)> {
    let mut offset = 0;
    let mut frames = 0;

    while buffer.len() - offset >= FRAME_HEADER_SIZE {
        let header = &buffer[offset..offset + FRAME_HEADER_SIZE];
        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let stored_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let start = offset + FRAME_HEADER_SIZE;
        if buffer.len() - start < len {
            break;
        }
        let payload = &buffer[start..start + len];
        if crc32fast::hash(payload) != stored_crc {
            warn!(offset, "CRC mismatch in kv log frame");
            break;
        }

        let batch = KvBatch::decode(payload).map_err(|e| LogDbError::Corruption {
            offset: offset as u64,
            detail: e.to_string(),
        })?;
        for record in batch.records {
            let op = record.op;
            let op = record.into_op().ok_or_else(|| LogDbError::Corruption {
                offset: offset as u64,
                detail: format!("unknown kv op {}", op),
            })?;
            apply_op(index, op);
        }

        offset = start + len;
        frames += 1;
    }

    Ok((offset, frames))
}

fn encode_frame(batch: &KvBatch) -> Result<Vec<u8>> {
    let payload = batch.encode();
    let len = u32::try_from(payload.len()).map_err(|_| LogDbError::BatchTooLarge {
        size: payload.len(),
    })?;
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

impl KvStore for FileKvStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.index.read().get(key).cloned())
    }

    fn scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(scan_map(&self.index.read(), start, end))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let ops = batch.into_ops();
        let persisted = KvBatch {
            records: ops.iter().cloned().map(KvRecord::from).collect(),
        };
        let frame = encode_frame(&persisted)?;

        // Held across the index update so readers see batches in log order
        let mut tail = self.tail.lock();
        tail.append(&frame, self.sync_writes)?;

        let mut index = self.index.write();
        for op in ops {
            apply_op(&mut index, op);
        }
        trace!(bytes = frame.len(), ops = persisted.records.len(), "Appended kv batch");
        Ok(())
    }
}
