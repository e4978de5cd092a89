//! Role dispatch — turns one inbound datagram into one outbound datagram.
//!
//! SERVER datagrams carry raw samples and leave as bare point records for
//! the server peer. CLIENT datagrams carry a compressed packet and leave as
//! raw samples for the client peer. Neither reply carries a role tag; a
//! peer relaying compressed records shifts them right by one Int Field and
//! writes its own tag in front. Anything else is dropped by the caller.

use std::net::SocketAddr;

use bytes::BytesMut;

use tactile_core::config::{CodecConfig, TactileConfig};
use tactile_core::packet::{decode_points, read_role, write_points};
use tactile_core::samples::{read_samples, write_samples};
use tactile_core::transform::{compress_frame, expand_points};
use tactile_core::{CodecError, Role, TransformError, WaveformTransform};

/// One outbound datagram. Borrows the bridge's scratch buffer.
#[derive(Debug)]
pub struct Reply<'a> {
    /// Role tag of the datagram that produced this reply.
    pub role: Role,
    pub dest: SocketAddr,
    pub payload: &'a [u8],
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Stateless apart from a reused scratch buffer.
pub struct Bridge<T> {
    transform: T,
    codec: CodecConfig,
    server_addr: SocketAddr,
    client_addr: SocketAddr,
    scratch: BytesMut,
}

impl<T: WaveformTransform> Bridge<T> {
    pub fn new(transform: T, config: &TactileConfig) -> Self {
        Self {
            transform,
            codec: config.codec.clone(),
            server_addr: config.network.server_addr,
            client_addr: config.network.client_addr,
            scratch: BytesMut::zeroed(config.network.buffer_size),
        }
    }

    /// Handle one datagram. The reply payload is valid until the next call.
    pub fn handle(&mut self, datagram: &[u8]) -> Result<Reply<'_>, BridgeError> {
        let (offset, role) = read_role(datagram)?;
        let (len, dest) = match role {
            Role::Server => (self.compress(datagram, offset)?, self.server_addr),
            Role::Client => (self.expand(datagram, offset)?, self.client_addr),
        };
        Ok(Reply {
            role,
            dest,
            payload: &self.scratch[..len],
        })
    }

    /// Raw samples in, point records out (no role tag).
    fn compress(&mut self, datagram: &[u8], offset: usize) -> Result<usize, BridgeError> {
        let (end, frame) = read_samples(
            datagram,
            offset,
            self.codec.point_count,
            self.codec.frame_count,
        )
        .map_err(CodecError::into_truncated)?;
        self.codec.trailing().check(end, datagram.len())?;

        let points = compress_frame(&self.transform, &frame)?;
        let len = write_points(&mut self.scratch, 0, &points)?;
        tracing::debug!(
            points = points.len(),
            raw_bytes = datagram.len(),
            packet_bytes = len,
            "frame compressed"
        );
        Ok(len)
    }

    /// CLIENT packet in, raw samples out (no role tag).
    fn expand(&mut self, datagram: &[u8], offset: usize) -> Result<usize, BridgeError> {
        let points = decode_points(
            datagram,
            offset,
            self.codec.point_count,
            self.codec.trailing(),
        )?;
        let frame = expand_points(&self.transform, &points, self.codec.frame_count)?;
        let len = write_samples(&mut self.scratch, 0, &frame)?;
        tracing::debug!(
            points = points.len(),
            packet_bytes = datagram.len(),
            raw_bytes = len,
            "packet expanded"
        );
        Ok(len)
    }
}
