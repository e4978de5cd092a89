//! Packet assembler — a role tag followed by a fixed number of point records.
//!
//! The number of points is agreed out of band by both peers. Decoding reads
//! exactly that many records and, by default, ignores anything after them.

use crate::field::{read_int, write_int};
use crate::point::PointRecord;
use crate::wire::{CodecError, Malformed, Role, INT_FIELD_LEN};

/// What to do with bytes left over after the last expected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trailing {
    /// Read only what is needed and ignore the rest.
    #[default]
    Tolerate,
    /// Fail with `MalformedPacket` unless the datagram is consumed exactly.
    Reject,
}

impl Trailing {
    /// Apply the policy to a datagram of `len` bytes parsed up to `end`.
    pub fn check(self, end: usize, len: usize) -> Result<(), CodecError> {
        match self {
            Trailing::Reject if end < len => Err(Malformed::TrailingBytes(len - end).into()),
            _ => Ok(()),
        }
    }
}

/// A decoded multi-point packet, keyed by the peer that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Server(Vec<PointRecord>),
    Client(Vec<PointRecord>),
}

impl Packet {
    pub fn new(role: Role, points: Vec<PointRecord>) -> Self {
        match role {
            Role::Server => Packet::Server(points),
            Role::Client => Packet::Client(points),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Packet::Server(_) => Role::Server,
            Packet::Client(_) => Role::Client,
        }
    }

    pub fn points(&self) -> &[PointRecord] {
        match self {
            Packet::Server(points) | Packet::Client(points) => points,
        }
    }

    pub fn into_points(self) -> Vec<PointRecord> {
        match self {
            Packet::Server(points) | Packet::Client(points) => points,
        }
    }

    /// Bytes this packet occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        INT_FIELD_LEN
            + self
                .points()
                .iter()
                .map(PointRecord::encoded_len)
                .sum::<usize>()
    }

    /// Write the packet at the start of `buf`. Only `buf[..n]` is valid.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        encode_packet(buf, self.role(), self.points())
    }
}

/// Write `role` then every point in order, starting at offset 0.
///
/// Returns the number of bytes written; callers transmit only that prefix.
pub fn encode_packet(
    buf: &mut [u8],
    role: Role,
    points: &[PointRecord],
) -> Result<usize, CodecError> {
    let offset = write_int(buf, 0, role.into())?;
    write_points(buf, offset, points)
}

/// Write every point in order at `offset`, with no role tag.
///
/// This is the bridge's reply to the encoding peer, which prepends its own
/// tag before relaying it.
pub fn write_points(
    buf: &mut [u8],
    offset: usize,
    points: &[PointRecord],
) -> Result<usize, CodecError> {
    points
        .iter()
        .try_fold(offset, |offset, point| point.write(buf, offset))
}

/// Read the raw role tag at the start of a datagram without interpreting it.
pub fn read_role_tag(datagram: &[u8]) -> Result<(usize, i32), CodecError> {
    read_int(datagram, 0).map_err(CodecError::into_truncated)
}

/// Read and resolve the role tag, failing with `UnknownRole` on other values.
pub fn read_role(datagram: &[u8]) -> Result<(usize, Role), CodecError> {
    let (offset, tag) = read_role_tag(datagram)?;
    Ok((offset, Role::try_from(tag)?))
}

/// Read exactly `count` point records starting at `offset`.
pub fn decode_points(
    datagram: &[u8],
    offset: usize,
    count: usize,
    trailing: Trailing,
) -> Result<Vec<PointRecord>, CodecError> {
    let mut offset = offset;
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let (next, point) =
            PointRecord::read(datagram, offset).map_err(CodecError::into_truncated)?;
        points.push(point);
        offset = next;
    }
    trailing.check(offset, datagram.len())?;
    Ok(points)
}

/// Decode a whole packet carrying `point_count` records.
pub fn decode_packet(
    datagram: &[u8],
    point_count: usize,
    trailing: Trailing,
) -> Result<Packet, CodecError> {
    let (offset, role) = read_role(datagram)?;
    let points = decode_points(datagram, offset, point_count, trailing)?;
    tracing::trace!(
        role = ?role,
        points = points.len(),
        bytes = datagram.len(),
        "packet decoded"
    );
    Ok(Packet::new(role, points))
}
