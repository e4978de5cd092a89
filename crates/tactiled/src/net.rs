//! UDP plumbing for the bridge.
//!
//! One socket receives from both peers and sends replies to both. Bad
//! datagrams are logged and dropped; the loop only exits on shutdown.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::broadcast;

use tactile_core::WaveformTransform;

use crate::bridge::Bridge;

/// Bytes of each datagram rendered in trace output.
const TRACE_HEAD_LEN: usize = 16;

/// Create a non-blocking UDP socket bound to `addr`.
pub fn bind_socket(addr: SocketAddr, buffer_size: usize) -> Result<UdpSocket> {
    let domain = Domain::for_address(addr);
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP)).context("socket()")?;

    socket.set_reuse_address(true).context("SO_REUSEADDR")?;
    socket.set_nonblocking(true).context("set_nonblocking")?;
    if let Err(e) = socket.set_recv_buffer_size(buffer_size.saturating_mul(4)) {
        tracing::debug!(error = %e, "SO_RCVBUF not applied");
    }
    socket
        .bind(&addr.into())
        .with_context(|| format!("bind({addr})"))?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket).context("failed to convert to tokio UdpSocket")
}

/// Receive, dispatch, reply. Runs until `shutdown` fires.
pub async fn bridge_loop<T: WaveformTransform>(
    socket: UdpSocket,
    mut bridge: Bridge<T>,
    buffer_size: usize,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let mut buf = vec![0u8; buffer_size];

    tracing::info!(addr = %socket.local_addr()?, buffer_size, "bridge listening");

    loop {
        let (len, peer) = tokio::select! {
            r = socket.recv_from(&mut buf) => match r {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(error = %e, "recv_from failed");
                    continue;
                }
            },
            _ = shutdown.recv() => {
                tracing::info!("bridge loop stopping");
                return Ok(());
            }
        };

        let datagram = &buf[..len];
        tracing::trace!(
            peer = %peer,
            bytes = len,
            head = hex::encode(&datagram[..len.min(TRACE_HEAD_LEN)]),
            "datagram received"
        );

        let reply = match bridge.handle(datagram) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(peer = %peer, bytes = len, error = %e, "dropping datagram");
                continue;
            }
        };

        match socket.send_to(reply.payload, reply.dest).await {
            Ok(sent) => tracing::debug!(
                role = ?reply.role,
                dest = %reply.dest,
                bytes = sent,
                "reply sent"
            ),
            Err(e) => tracing::warn!(dest = %reply.dest, error = %e, "send_to failed"),
        }
    }
}
