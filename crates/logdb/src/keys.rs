//! Key layout
//!
//! Every key is 25 bytes except snapshot keys (17 bytes):
//!
//! ```text
//! [prefix: u8][shard: u64 BE][replica: u64 BE][index or batch id: u64 BE]
//! ```
//!
//! Big-endian integers make byte order equal numeric order, so a range scan
//! over keys walks entries in index order.

use byteorder::{BigEndian, ByteOrder};

const ENTRY_PREFIX: u8 = 0x01;
const BATCH_PREFIX: u8 = 0x02;
const SNAPSHOT_PREFIX: u8 = 0x03;

/// Length of entry and batch keys
pub const KEY_LEN: usize = 25;

/// Length of snapshot keys
pub const SNAPSHOT_KEY_LEN: usize = 17;

fn replica_key(prefix: u8, shard: u64, replica: u64, id: u64) -> Vec<u8> {
    let mut key = vec![0u8; KEY_LEN];
    key[0] = prefix;
    BigEndian::write_u64(&mut key[1..9], shard);
    BigEndian::write_u64(&mut key[9..17], replica);
    BigEndian::write_u64(&mut key[17..25], id);
    key
}

/// Key of a single entry (plain layout)
pub fn entry_key(shard: u64, replica: u64, index: u64) -> Vec<u8> {
    replica_key(ENTRY_PREFIX, shard, replica, index)
}

/// Key of an entry batch (batched layout)
pub fn batch_key(shard: u64, replica: u64, batch_id: u64) -> Vec<u8> {
    replica_key(BATCH_PREFIX, shard, replica, batch_id)
}

/// Key of the latest snapshot header of a replica
pub fn snapshot_key(shard: u64, replica: u64) -> Vec<u8> {
    let mut key = vec![0u8; SNAPSHOT_KEY_LEN];
    key[0] = SNAPSHOT_PREFIX;
    BigEndian::write_u64(&mut key[1..9], shard);
    BigEndian::write_u64(&mut key[9..17], replica);
    key
}

/// Trailing index or batch id of an entry/batch key
pub fn key_id(key: &[u8]) -> Option<u64> {
    if key.len() != KEY_LEN {
        return None;
    }
    Some(BigEndian::read_u64(&key[17..25]))
}
