//! Field codec — int and blob fields at explicit offsets.
//!
//! Every function takes a buffer and a start offset and returns the offset
//! immediately after the field. There is no hidden cursor: callers thread
//! the returned offset into the next call. Writes are not transactional.

use zerocopy::byteorder::{LittleEndian, I32};
use zerocopy::{AsBytes, FromBytes};

use crate::wire::{CodecError, Malformed, DOUBLE_LEN, INT_FIELD_LEN};

/// End offset of a `len`-byte field at `offset`, or `OutOfBounds`.
fn span(capacity: usize, offset: usize, len: usize) -> Result<usize, CodecError> {
    offset
        .checked_add(len)
        .filter(|&end| end <= capacity)
        .ok_or(CodecError::OutOfBounds {
            offset,
            needed: len,
            capacity,
        })
}

/// Convert a blob length into its int field value.
fn length_field(offset: usize, len: usize, capacity: usize) -> Result<i32, CodecError> {
    i32::try_from(len).map_err(|_| CodecError::OutOfBounds {
        offset,
        needed: len,
        capacity,
    })
}

// ── Int ───────────────────────────────────────────────────────────────────────

/// Write a 4-byte little-endian int.
pub fn write_int(buf: &mut [u8], offset: usize, value: i32) -> Result<usize, CodecError> {
    let end = span(buf.len(), offset, INT_FIELD_LEN)?;
    buf[offset..end].copy_from_slice(I32::<LittleEndian>::new(value).as_bytes());
    Ok(end)
}

/// Read a 4-byte little-endian int.
pub fn read_int(buf: &[u8], offset: usize) -> Result<(usize, i32), CodecError> {
    let capacity = buf.len();
    let end = span(capacity, offset, INT_FIELD_LEN)?;
    let value = I32::<LittleEndian>::read_from(&buf[offset..end])
        .ok_or(CodecError::OutOfBounds {
            offset,
            needed: INT_FIELD_LEN,
            capacity,
        })?
        .get();
    Ok((end, value))
}

// ── Blob ──────────────────────────────────────────────────────────────────────

/// Write a length-prefixed blob.
///
/// The length field is written before the payload range is checked, so an
/// oversized blob fails with `OutOfBounds` after its length is already in
/// the buffer.
pub fn write_bytes(buf: &mut [u8], offset: usize, blob: &[u8]) -> Result<usize, CodecError> {
    let len = length_field(offset, blob.len(), buf.len())?;
    let start = write_int(buf, offset, len)?;
    let end = span(buf.len(), start, blob.len())?;
    buf[start..end].copy_from_slice(blob);
    Ok(end)
}

/// Read a length-prefixed blob, borrowing it from the buffer.
pub fn read_bytes(buf: &[u8], offset: usize) -> Result<(usize, &[u8]), CodecError> {
    let (start, count) = read_int(buf, offset)?;
    let count = usize::try_from(count).map_err(|_| Malformed::NegativeLength(count))?;
    let end = span(buf.len(), start, count)?;
    Ok((end, &buf[start..end]))
}

// ── Double arrays ─────────────────────────────────────────────────────────────

/// Write `values` as one blob of concatenated little-endian f64s.
///
/// Equivalent to serializing the doubles and calling [`write_bytes`], without
/// the intermediate allocation. Same length-first failure behavior.
pub fn write_doubles(buf: &mut [u8], offset: usize, values: &[f64]) -> Result<usize, CodecError> {
    let byte_len = values.len().saturating_mul(DOUBLE_LEN);
    let len = length_field(offset, byte_len, buf.len())?;
    let start = write_int(buf, offset, len)?;
    let end = span(buf.len(), start, byte_len)?;
    for (slot, value) in buf[start..end].chunks_exact_mut(DOUBLE_LEN).zip(values) {
        slot.copy_from_slice(&value.to_le_bytes());
    }
    Ok(end)
}

/// Read a blob of concatenated little-endian f64s.
pub fn read_doubles(buf: &[u8], offset: usize) -> Result<(usize, Vec<f64>), CodecError> {
    let (end, blob) = read_bytes(buf, offset)?;
    if blob.len() % DOUBLE_LEN != 0 {
        return Err(Malformed::UnalignedDoubles(blob.len()).into());
    }
    let values = blob
        .chunks_exact(DOUBLE_LEN)
        .map(|chunk| {
            let mut raw = [0u8; DOUBLE_LEN];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect();
    Ok((end, values))
}
