//! Bit packer — folds a run of single-bit codes into bytes and back.
//!
//! Bits are packed MSB-first. A final partial byte is padded with zero bits
//! in its low positions. The padding is not part of the sequence, so
//! unpacking needs the true bit length to cut it off again.

use crate::wire::{CodecError, Malformed};

/// Number of bytes needed to hold `bit_len` bits.
pub fn packed_len(bit_len: usize) -> usize {
    bit_len.div_ceil(8)
}

/// Pack a sequence of bits into `ceil(len / 8)` bytes.
///
/// Any non-zero input value counts as a 1 bit.
pub fn pack(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | (u8::from(bit != 0) << (7 - i)))
        })
        .collect()
}

/// Expand `bytes` MSB-first and keep exactly `bit_len` bits.
///
/// Fails with `MalformedPacket` if `bit_len` is negative or larger than the
/// bytes can hold.
pub fn unpack(bytes: &[u8], bit_len: i32) -> Result<Vec<u8>, CodecError> {
    let capacity = bytes.len() * 8;
    let bit_len = usize::try_from(bit_len)
        .ok()
        .filter(|&n| n <= capacity)
        .ok_or(Malformed::BitLengthExceedsPacked { bit_len, capacity })?;

    let mut bits = Vec::with_capacity(bit_len);
    for &byte in bytes {
        for shift in (0..8).rev() {
            if bits.len() == bit_len {
                return Ok(bits);
            }
            bits.push((byte >> shift) & 1);
        }
    }
    Ok(bits)
}
