//! Tactile wire format — the shared vocabulary of every datagram.
//!
//! All integers on the wire are 4-byte little-endian two's-complement.
//! There is no variable-length integer encoding anywhere in the protocol.
//! Blobs are an int length followed by that many raw bytes. Floating-point
//! side arrays are concatenated 8-byte little-endian IEEE-754 doubles.
//!
//! ```text
//! Packet        := RoleTag:int4 Point{point_count}
//! Point         := Blob(packed_bits) Blob(extremum_index) Blob(extremum_value) BitLength:int4
//! Blob(x)       := Length:int4 x:byte[Length]
//! ```
//!
//! The point count is agreed out of band. It is never carried on the wire.

use static_assertions::assert_eq_size;
use zerocopy::byteorder::{LittleEndian, I32};

/// Width of an Int Field on the wire.
pub const INT_FIELD_LEN: usize = 4;

/// Width of one serialized extremum (an f64).
pub const DOUBLE_LEN: usize = 8;

// Compile-time size guard. If this fails, the int field width has changed.
assert_eq_size!(I32<LittleEndian>, [u8; INT_FIELD_LEN]);
assert_eq_size!(f64, [u8; DOUBLE_LEN]);

/// Full-scale magnitude of the 16-bit sample domain.
/// A unit-range float `v` maps to the sample `round(v * SAMPLE_SCALE)`.
pub const SAMPLE_SCALE: f64 = 32768.0;

/// Smallest representable sample.
pub const SAMPLE_MIN: i32 = i16::MIN as i32;

/// Largest representable sample.
pub const SAMPLE_MAX: i32 = i16::MAX as i32;

// ── Role ──────────────────────────────────────────────────────────────────────

/// Which peer produced a datagram.
///
/// The tag identifies the sender, not the recipient. A bridge that sees
/// `Server` knows the payload came from the encoding side; `Client` means
/// it came from the decoding side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Role {
    Server = 0,
    Client = 1,
}

impl TryFrom<i32> for Role {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Server),
            1 => Ok(Role::Client),
            other => Err(CodecError::UnknownRole(other)),
        }
    }
}

impl From<Role> for i32 {
    fn from(r: Role) -> i32 {
        r as i32
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors raised while composing or parsing a datagram.
///
/// None of these are retried. A failed write may leave earlier fields in the
/// buffer; the caller must treat the whole buffer as garbage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("field of {needed} bytes at offset {offset} overruns buffer of {capacity} bytes")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        capacity: usize,
    },

    #[error("malformed packet: {0}")]
    MalformedPacket(Malformed),

    #[error("unknown role tag: {0}")]
    UnknownRole(i32),
}

/// The specific inconsistency behind a [`CodecError::MalformedPacket`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    #[error("negative length field {0}")]
    NegativeLength(i32),

    #[error("bit length {bit_len} exceeds packed capacity of {capacity} bits")]
    BitLengthExceedsPacked { bit_len: i32, capacity: usize },

    #[error("double array blob of {0} bytes is not a multiple of 8")]
    UnalignedDoubles(usize),

    #[error("extremum index count {index} does not match value count {value}")]
    ExtremumCountMismatch { index: usize, value: usize },

    #[error("field of {needed} bytes at offset {offset} runs past end of {available}-byte datagram")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{0} trailing bytes left after the last field")]
    TrailingBytes(usize),
}

impl From<Malformed> for CodecError {
    fn from(m: Malformed) -> Self {
        CodecError::MalformedPacket(m)
    }
}

impl CodecError {
    /// Re-labels a read overrun as a truncated datagram.
    ///
    /// At the field level an overrun is `OutOfBounds`. Once we are parsing a
    /// received datagram, the same overrun means the sender declared more
    /// bytes than it sent.
    pub fn into_truncated(self) -> Self {
        match self {
            CodecError::OutOfBounds {
                offset,
                needed,
                capacity,
            } => CodecError::MalformedPacket(Malformed::Truncated {
                offset,
                needed,
                available: capacity,
            }),
            other => other,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
