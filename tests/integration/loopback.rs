use crate::*;

use tactile_core::transform::{compress_frame, expand_points};
use tactile_core::{decode_packet, DeltaModulator, Packet, SampleFrame, Trailing};

// ══════════════════════════════════════════════════════════════════════════════
//  Real datagrams over loopback
// ══════════════════════════════════════════════════════════════════════════════

/// Only the valid prefix is sent; the receiver decodes it exactly.
#[test]
fn test_packet_survives_udp() {
    let (tx, rx) = socket_pair().unwrap();
    let points: Vec<PointRecord> = (0..3)
        .map(|i| PointRecord::new(bits(100 + i, i as u32), vec![1.0], vec![0.5]).unwrap())
        .collect();
    let bytes = encode(Role::Server, &points).unwrap();
    assert!(bytes.len() < DATAGRAM_SIZE);
    tx.send(&bytes).unwrap();

    let mut buf = [0u8; DATAGRAM_SIZE];
    let (len, _) = rx.recv_from(&mut buf).unwrap();
    assert_eq!(len, bytes.len());
    let decoded = decode_packet(&buf[..len], 3, Trailing::Reject).unwrap();
    assert_eq!(decoded, Packet::Server(points));
}

/// Reference deployment: 3 points × 512 frames compress into one datagram
/// and expand back with the extremum samples intact.
#[test]
fn test_reference_deployment_fits_one_datagram() {
    let frame = SampleFrame::from_points(
        (0..3)
            .map(|p| {
                (0..512)
                    .map(|i| ((i as f64 / (20.0 + p as f64 * 7.0)).sin() * 20000.0) as i32)
                    .collect()
            })
            .collect(),
    )
    .unwrap();

    let dm = DeltaModulator::default();
    let points = compress_frame(&dm, &frame).unwrap();
    let bytes = encode(Role::Server, &points).unwrap();
    assert!(bytes.len() <= DATAGRAM_SIZE);
    // 64 packed bytes plus two extrema per point, far below the raw 6144 bytes.
    assert_eq!(bytes.len(), 4 + 3 * (4 + 64 + 4 + 16 + 4 + 16 + 4));

    let (tx, rx) = socket_pair().unwrap();
    tx.send(&bytes).unwrap();
    let mut buf = [0u8; DATAGRAM_SIZE];
    let (len, _) = rx.recv_from(&mut buf).unwrap();

    let decoded = decode_packet(&buf[..len], 3, Trailing::Reject).unwrap();
    let restored = expand_points(&dm, decoded.points(), 512).unwrap();
    for p in 0..3 {
        let original = frame.point(p);
        let max = *original.iter().max().unwrap();
        let min = *original.iter().min().unwrap();
        let at_max = original.iter().position(|&v| v == max).unwrap();
        let at_min = original.iter().position(|&v| v == min).unwrap();
        assert_eq!(restored.point(p)[at_max], max);
        assert_eq!(restored.point(p)[at_min], min);
    }
}
