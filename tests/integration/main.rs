//! Tactile integration test harness.
//!
//! These tests exercise tactile-core through its public API only, the way a
//! peer implementation would, including real datagrams over loopback UDP.
//!
//!   cargo test --test integration

mod loopback;
mod scenarios;

use anyhow::{Context, Result};
use std::net::UdpSocket;
use std::time::Duration;

use tactile_core::{encode_packet, PointRecord, Role};

/// Default scratch size used by the reference deployment.
pub const DATAGRAM_SIZE: usize = 8192;

/// A pair of connected loopback sockets: (sender, receiver).
pub fn socket_pair() -> Result<(UdpSocket, UdpSocket)> {
    let rx = UdpSocket::bind("127.0.0.1:0").context("bind receiver")?;
    rx.set_read_timeout(Some(Duration::from_secs(5)))?;
    let tx = UdpSocket::bind("127.0.0.1:0").context("bind sender")?;
    tx.connect(rx.local_addr()?).context("connect sender")?;
    Ok((tx, rx))
}

/// Encode `points` into a fresh scratch buffer and return the valid prefix.
pub fn encode(role: Role, points: &[PointRecord]) -> Result<Vec<u8>> {
    let mut scratch = vec![0u8; DATAGRAM_SIZE];
    let len = encode_packet(&mut scratch, role, points).context("encode packet")?;
    scratch.truncate(len);
    Ok(scratch)
}

/// Deterministic pseudo-random bit sequence.
pub fn bits(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 1) as u8
        })
        .collect()
}
