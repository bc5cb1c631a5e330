//! Replicated log entries
//!
//! `Entry` is one record of the replicated log; `EntryBatch` groups
//! consecutive entries so a log store can persist them under one key.

use crate::enums::EntryType;
use snapwire_codec::{decode_nested, Field, FieldKind, Message};

/// A replicated log entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Term the entry was proposed in
    pub term: u64,
    /// Log position
    pub index: u64,
    /// Entry kind
    pub entry_type: EntryType,
    /// Proposal key used for client deduplication
    pub key: u64,
    /// Client session id
    pub client_id: u64,
    /// Client session series id
    pub series_id: u64,
    /// Highest series id the client has seen responded to
    pub responded_to: u64,
    /// Command payload
    pub cmd: Vec<u8>,
}

impl Entry {
    /// Create an application entry
    pub fn new(term: u64, index: u64, cmd: impl Into<Vec<u8>>) -> Self {
        Entry {
            term,
            index,
            cmd: cmd.into(),
            ..Default::default()
        }
    }
}

impl Message for Entry {
    const NAME: &'static str = "Entry";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            number: 1,
            name: "term",
            kind: FieldKind::Varint {
                get: |m| m.term,
                set: |m, v| m.term = v,
            },
        },
        Field {
            number: 2,
            name: "index",
            kind: FieldKind::Varint {
                get: |m| m.index,
                set: |m, v| m.index = v,
            },
        },
        Field {
            number: 3,
            name: "entry_type",
            kind: FieldKind::Varint {
                get: |m| m.entry_type.as_u64(),
                set: |m, v| m.entry_type = EntryType::from(v),
            },
        },
        Field {
            number: 4,
            name: "key",
            kind: FieldKind::Varint {
                get: |m| m.key,
                set: |m, v| m.key = v,
            },
        },
        Field {
            number: 5,
            name: "client_id",
            kind: FieldKind::Varint {
                get: |m| m.client_id,
                set: |m, v| m.client_id = v,
            },
        },
        Field {
            number: 6,
            name: "series_id",
            kind: FieldKind::Varint {
                get: |m| m.series_id,
                set: |m, v| m.series_id = v,
            },
        },
        Field {
            number: 7,
            name: "responded_to",
            kind: FieldKind::Varint {
                get: |m| m.responded_to,
                set: |m, v| m.responded_to = v,
            },
        },
        Field {
            number: 8,
            name: "cmd",
            kind: FieldKind::Bytes {
                get: |m| Some(m.cmd.as_slice()),
                set: |m, v| m.cmd = v,
            },
        },
    ];
}

/// Consecutive entries stored together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryBatch {
    /// Entries in index order
    pub entries: Vec<Entry>,
}

impl Message for EntryBatch {
    const NAME: &'static str = "EntryBatch";
    const FIELDS: &'static [Field<Self>] = &[Field {
        number: 1,
        name: "entries",
        kind: FieldKind::Messages {
            count: |m| m.entries.len(),
            get: |m, i| &m.entries[i],
            push: |m, body| decode_nested(body, &mut m.entries),
        },
    }];
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapwire_codec::DecodeError;

    #[test]
    fn test_entry_roundtrip() {
        let entry = Entry {
            term: 3,
            index: 1 << 33,
            entry_type: EntryType::ConfigChange,
            key: 99,
            client_id: u64::MAX,
            series_id: 7,
            responded_to: 6,
            cmd: b"set x=1".to_vec(),
        };
        let bytes = entry.encode();
        assert_eq!(bytes.len(), entry.encoded_len());
        assert_eq!(Entry::decode(&bytes).unwrap(), entry);
    }

    #[test]
    fn test_entry_empty_cmd_written() {
        let entry = Entry::new(1, 1, Vec::new());
        let bytes = entry.encode();
        // Last field is cmd: tag 0x42, length 0
        assert_eq!(&bytes[bytes.len() - 2..], &[0x42, 0x00]);
    }

    #[test]
    fn test_batch_roundtrip() {
        let batch = EntryBatch {
            entries: (1..=5).map(|i| Entry::new(1, i, vec![i as u8; i as usize])).collect(),
        };
        let bytes = batch.encode();
        assert_eq!(bytes.len(), batch.encoded_len());
        assert_eq!(EntryBatch::decode(&bytes).unwrap(), batch);
    }

    #[test]
    fn test_empty_batch_encodes_to_nothing() {
        let batch = EntryBatch::default();
        assert!(batch.encode().is_empty());
        assert_eq!(EntryBatch::decode(&[]).unwrap(), batch);
    }

    #[test]
    fn test_batch_corrupt_element() {
        let batch = EntryBatch {
            entries: vec![Entry::new(1, 1, b"abc".to_vec())],
        };
        let mut bytes = batch.encode();
        // Claim the element body is one byte longer than it is
        bytes[1] += 1;
        assert!(matches!(
            EntryBatch::decode(&bytes),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
