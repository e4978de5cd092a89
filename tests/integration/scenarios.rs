use crate::*;

use tactile_core::field::{read_int, write_bytes, write_int};
use tactile_core::packet::read_role_tag;
use tactile_core::{decode_packet, CodecError, Malformed, Packet, Trailing};

// ══════════════════════════════════════════════════════════════════════════════
//  Packet scenarios
// ══════════════════════════════════════════════════════════════════════════════

/// SERVER, one point, a full byte of bits: blob lengths 1/16/16, bit length 8.
#[test]
fn test_single_point_server_packet() {
    let point = PointRecord::new(
        vec![1, 0, 0, 1, 1, 0, 1, 0],
        vec![0.0, 7.0],
        vec![-0.5, 0.5],
    )
    .unwrap();
    let bytes = encode(Role::Server, std::slice::from_ref(&point)).unwrap();

    assert_eq!(read_int(&bytes, 0).unwrap(), (4, 0));
    assert_eq!(read_int(&bytes, 4).unwrap().1, 1);
    assert_eq!(bytes[8], 0b1001_1010);
    assert_eq!(read_int(&bytes, 9).unwrap().1, 16);
    assert_eq!(read_int(&bytes, 29).unwrap().1, 16);
    assert_eq!(read_int(&bytes, 49).unwrap(), (53, 8));
    assert_eq!(bytes.len(), 53);

    let decoded = decode_packet(&bytes, 1, Trailing::Reject).unwrap();
    assert_eq!(decoded, Packet::Server(vec![point]));
}

/// Three points with assorted bit lengths survive a full round trip.
#[test]
fn test_three_point_round_trip() {
    let points: Vec<PointRecord> = [(3usize, 1usize), (512, 2), (17, 0)]
        .iter()
        .enumerate()
        .map(|(i, &(n, extrema))| {
            let idx = (0..extrema).map(|k| (k * 5) as f64).collect();
            let val = (0..extrema).map(|k| k as f64 * 0.25 - 0.5).collect();
            PointRecord::new(bits(n, i as u32 + 1), idx, val).unwrap()
        })
        .collect();

    let bytes = encode(Role::Client, &points).unwrap();
    let decoded = decode_packet(&bytes, 3, Trailing::Reject).unwrap();
    assert_eq!(decoded.role(), Role::Client);
    assert_eq!(decoded.into_points(), points);
}

/// A point claiming 100 bits with a 4-byte blob is rejected.
#[test]
fn test_bit_length_larger_than_blob_rejected() {
    let mut buf = [0u8; 64];
    let mut offset = write_int(&mut buf, 0, Role::Client.into()).unwrap();
    offset = write_bytes(&mut buf, offset, &[0xff; 4]).unwrap();
    offset = write_bytes(&mut buf, offset, &[]).unwrap();
    offset = write_bytes(&mut buf, offset, &[]).unwrap();
    let end = write_int(&mut buf, offset, 100).unwrap();

    let err = decode_packet(&buf[..end], 1, Trailing::Tolerate).unwrap_err();
    assert_eq!(
        err,
        CodecError::MalformedPacket(Malformed::BitLengthExceedsPacked {
            bit_len: 100,
            capacity: 32
        })
    );
}

/// The raw tag is readable even when it is not a known role.
#[test]
fn test_unknown_role_tag_preserved() {
    let mut bytes = encode(Role::Server, &[]).unwrap();
    write_int(&mut bytes, 0, 3).unwrap();
    assert_eq!(read_role_tag(&bytes).unwrap(), (4, 3));
    assert_eq!(
        decode_packet(&bytes, 0, Trailing::Tolerate),
        Err(CodecError::UnknownRole(3))
    );
}

/// Packets that do not fit the scratch buffer fail instead of truncating.
#[test]
fn test_oversized_packet_does_not_fit_datagram() {
    let huge = PointRecord::new(bits(DATAGRAM_SIZE * 8 + 1, 9), vec![], vec![]).unwrap();
    assert!(matches!(
        encode(Role::Server, &[huge])
            .unwrap_err()
            .downcast_ref::<CodecError>(),
        Some(CodecError::OutOfBounds { .. })
    ));
}
