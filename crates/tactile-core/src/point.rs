//! Point record codec — one touch point's transform output on the wire.
//!
//! ```text
//! Point := Blob(packed_bits) Blob(extremum_index) Blob(extremum_value) BitLength:int4
//! ```
//!
//! Bits travel packed; the trailing int restores their true length.

use crate::bitpack;
use crate::field::{read_bytes, read_doubles, read_int, write_bytes, write_doubles, write_int};
use crate::wire::{CodecError, Malformed, DOUBLE_LEN, INT_FIELD_LEN};

/// Transform output for a single touch point.
///
/// `extremum_index` and `extremum_value` are paired: entry `i` of each
/// describes the same extremum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointRecord {
    /// Binary codes, one per element, each 0 or 1.
    pub bits: Vec<u8>,
    /// Sample positions of the extrema.
    pub extremum_index: Vec<f64>,
    /// Sample values at those positions.
    pub extremum_value: Vec<f64>,
}

impl PointRecord {
    /// Build a record, rejecting unpaired extremum arrays.
    pub fn new(
        bits: Vec<u8>,
        extremum_index: Vec<f64>,
        extremum_value: Vec<f64>,
    ) -> Result<Self, CodecError> {
        let record = Self {
            bits,
            extremum_index,
            extremum_value,
        };
        record.check_paired()?;
        Ok(record)
    }

    /// The true number of meaningful bits.
    pub fn bit_length(&self) -> usize {
        self.bits.len()
    }

    /// Bytes this record occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        4 * INT_FIELD_LEN
            + bitpack::packed_len(self.bits.len())
            + DOUBLE_LEN * (self.extremum_index.len() + self.extremum_value.len())
    }

    fn check_paired(&self) -> Result<(), Malformed> {
        if self.extremum_index.len() != self.extremum_value.len() {
            return Err(Malformed::ExtremumCountMismatch {
                index: self.extremum_index.len(),
                value: self.extremum_value.len(),
            });
        }
        Ok(())
    }

    /// Write this record at `offset`, returning the offset after it.
    pub fn write(&self, buf: &mut [u8], offset: usize) -> Result<usize, CodecError> {
        self.check_paired()?;
        let bit_len = i32::try_from(self.bits.len()).map_err(|_| CodecError::OutOfBounds {
            offset,
            needed: self.encoded_len(),
            capacity: buf.len(),
        })?;

        let packed = bitpack::pack(&self.bits);
        let offset = write_bytes(buf, offset, &packed)?;
        let offset = write_doubles(buf, offset, &self.extremum_index)?;
        let offset = write_doubles(buf, offset, &self.extremum_value)?;
        write_int(buf, offset, bit_len)
    }

    /// Read a record at `offset`, returning the offset after it.
    pub fn read(buf: &[u8], offset: usize) -> Result<(usize, Self), CodecError> {
        let (offset, packed) = read_bytes(buf, offset)?;
        let (offset, extremum_index) = read_doubles(buf, offset)?;
        let (offset, extremum_value) = read_doubles(buf, offset)?;
        let (offset, bit_len) = read_int(buf, offset)?;

        let record = Self {
            bits: bitpack::unpack(packed, bit_len)?,
            extremum_index,
            extremum_value,
        };
        record.check_paired()?;
        Ok((offset, record))
    }
}
