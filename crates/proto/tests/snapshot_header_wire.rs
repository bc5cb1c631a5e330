//! Wire-level tests for the snapshot header
//!
//! These tests verify:
//! - Round-trip and exact size prediction for arbitrary headers
//! - Truncation at any offset fails cleanly, never panics
//! - Unknown fields from newer producers are skipped
//! - Hostile length prefixes are rejected
//! - A failed decode never yields a partially populated header

use proptest::prelude::*;
use snapwire_codec::{varint, DecodeError, MAX_VARINT_LEN};
use snapwire_proto::{ChecksumType, CompressionType, Message, SnapshotHeader};

fn arb_header() -> impl Strategy<Value = SnapshotHeader> {
    (
        (any::<u64>(), any::<u64>(), any::<u64>()),
        "[ -~]{0,40}",
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..40)),
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..40)),
        (0u64..4, any::<u64>(), 0u64..3),
    )
        .prop_map(
            |((session, store, time), git, hsum, psum, (ctype, version, comp))| SnapshotHeader {
                session_size: session,
                data_store_size: store,
                unreliable_time: time,
                git_version: git,
                header_checksum: hsum,
                payload_checksum: psum,
                checksum_type: ChecksumType::from(ctype),
                version,
                compression_type: CompressionType::from(comp),
            },
        )
}

/// Offsets at which a field ends, i.e. where a cut leaves a valid shorter record
fn field_boundaries(bytes: &[u8]) -> Vec<usize> {
    let mut reader = snapwire_codec::Reader::new(bytes);
    let mut ends = vec![0];
    while !reader.is_empty() {
        let tag = reader.read_tag().unwrap();
        match tag.wire_type {
            snapwire_codec::WireType::Varint => {
                reader.read_varint().unwrap();
            }
            _ => {
                reader.read_length_delimited().unwrap();
            }
        }
        ends.push(reader.position());
    }
    ends
}

proptest! {
    #[test]
    fn roundtrip_preserves_every_field(header in arb_header()) {
        let bytes = header.encode();
        prop_assert_eq!(bytes.len(), header.encoded_len());
        let decoded = SnapshotHeader::decode(&bytes).unwrap();
        prop_assert_eq!(&decoded, &header);
        // Re-encoding is byte-identical
        prop_assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn truncation_never_panics(header in arb_header()) {
        let bytes = header.encode();
        let boundaries = field_boundaries(&bytes);
        for cut in 0..bytes.len() {
            let result = SnapshotHeader::decode(&bytes[..cut]);
            if boundaries.contains(&cut) {
                // A cut between fields is itself a valid record
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(
                    matches!(result, Err(DecodeError::Truncated { .. })),
                    "cut at {} of {} gave {:?}", cut, bytes.len(), result
                );
            }
        }
    }

    #[test]
    fn unknown_field_is_skipped(header in arb_header(), number in 10u32..100_000, value in any::<u64>(), blob in proptest::collection::vec(any::<u8>(), 0..20)) {
        let mut bytes = header.encode();
        // Append one varint and one length-delimited field the schema does not know
        let mut buf = [0u8; MAX_VARINT_LEN];
        let n = varint::encode(u64::from(number) << 3, &mut buf);
        bytes.extend_from_slice(&buf[..n]);
        let n = varint::encode(value, &mut buf);
        bytes.extend_from_slice(&buf[..n]);
        let n = varint::encode((u64::from(number + 1) << 3) | 2, &mut buf);
        bytes.extend_from_slice(&buf[..n]);
        let n = varint::encode(blob.len() as u64, &mut buf);
        bytes.extend_from_slice(&buf[..n]);
        bytes.extend_from_slice(&blob);

        prop_assert_eq!(SnapshotHeader::decode(&bytes).unwrap(), header);
    }
}

#[test]
fn concrete_scenario() {
    let header = SnapshotHeader {
        session_size: 100,
        data_store_size: 4096,
        unreliable_time: 1_700_000_000,
        git_version: "v1.2.3".to_string(),
        header_checksum: None,
        payload_checksum: Some(vec![0xaa, 0xbb]),
        checksum_type: ChecksumType::from(1),
        version: 2,
        compression_type: CompressionType::from(0),
    };

    let bytes = header.encode();
    assert_eq!(bytes.len(), header.encoded_len());

    let decoded = SnapshotHeader::decode(&bytes).unwrap();
    assert_eq!(decoded.session_size, 100);
    assert_eq!(decoded.data_store_size, 4096);
    assert_eq!(decoded.unreliable_time, 1_700_000_000);
    assert_eq!(decoded.git_version, "v1.2.3");
    assert!(decoded.header_checksum.is_none());
    assert_eq!(decoded.payload_checksum, Some(vec![0xaa, 0xbb]));
    assert_eq!(decoded.checksum_type.as_u64(), 1);
    assert_eq!(decoded.version, 2);
    assert_eq!(decoded.compression_type.as_u64(), 0);
}

#[test]
fn fields_in_reverse_order_decode() {
    let header = SnapshotHeader::new(5, 6).with_git_version("rev");
    let forward = header.encode();

    // Re-emit each field in reverse order
    let mut reader = snapwire_codec::Reader::new(&forward);
    let mut spans = Vec::new();
    while !reader.is_empty() {
        let start = reader.position();
        let tag = reader.read_tag().unwrap();
        match tag.wire_type {
            snapwire_codec::WireType::Varint => {
                reader.read_varint().unwrap();
            }
            _ => {
                reader.read_length_delimited().unwrap();
            }
        }
        spans.push(start..reader.position());
    }
    let reversed: Vec<u8> = spans
        .iter()
        .rev()
        .flat_map(|span| forward[span.clone()].iter().copied())
        .collect();

    assert_eq!(SnapshotHeader::decode(&reversed).unwrap(), header);
}

#[test]
fn repeated_field_last_write_wins() {
    let mut bytes = SnapshotHeader::new(1, 1).encode();
    bytes.extend_from_slice(&[0x08, 0x09]); // session_size = 9
    assert_eq!(SnapshotHeader::decode(&bytes).unwrap().session_size, 9);
}

#[test]
fn malicious_length_on_git_version() {
    for length in [1u64 << 32, (1u64 << 63) - 1, 1u64 << 63, u64::MAX] {
        let mut bytes = vec![0x08, 0x01, 0x22];
        let mut buf = [0u8; MAX_VARINT_LEN];
        let n = varint::encode(length, &mut buf);
        bytes.extend_from_slice(&buf[..n]);
        bytes.extend_from_slice(b"v1");

        let err = SnapshotHeader::decode(&bytes).unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::InvalidLength { .. } | DecodeError::Truncated { .. }
            ),
            "length {} gave {:?}",
            length,
            err
        );
    }
}

#[test]
fn overlong_varint_rejected() {
    let mut bytes = vec![0x08];
    bytes.extend_from_slice(&[0xff; 10]);
    bytes.push(0x01);
    assert!(matches!(
        SnapshotHeader::decode(&bytes),
        Err(DecodeError::Overflow { offset: 1 })
    ));
}

#[test]
fn zero_field_number_rejected() {
    let mut bytes = SnapshotHeader::new(1, 2).encode();
    bytes.extend_from_slice(&[0x00, 0x01]);
    assert!(matches!(
        SnapshotHeader::decode(&bytes),
        Err(DecodeError::InvalidTag { .. })
    ));
}

#[test]
fn legacy_group_field_skipped() {
    let mut bytes = SnapshotHeader::new(3, 4).encode();
    // start-group 12, varint field 1 = 5, end-group 12
    bytes.extend_from_slice(&[0x63, 0x08, 0x05, 0x64]);
    assert_eq!(
        SnapshotHeader::decode(&bytes).unwrap(),
        SnapshotHeader::new(3, 4)
    );

    // A stray end-group is rejected
    let mut bytes = SnapshotHeader::new(3, 4).encode();
    bytes.push(0x64);
    assert!(matches!(
        SnapshotHeader::decode(&bytes),
        Err(DecodeError::UnknownWireType { wire_type: 4, .. })
    ));
}
