//! Raw sample frames — the uncompressed side of the bridge.
//!
//! A frame is `points × frames` samples in the 16-bit signed domain, stored
//! point-major. On the wire each sample is an Int Field, so a frame of
//! 3 × 512 samples is 6144 bytes.

use crate::field::{read_int, write_int};
use crate::wire::{CodecError, INT_FIELD_LEN, SAMPLE_MAX, SAMPLE_MIN, SAMPLE_SCALE};

/// Samples for every touch point over one compression window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFrame {
    points: usize,
    frames: usize,
    samples: Vec<i32>,
}

impl SampleFrame {
    /// A zeroed frame.
    pub fn new(points: usize, frames: usize) -> Self {
        Self {
            points,
            frames,
            samples: vec![0; points * frames],
        }
    }

    /// Build from one sample vector per point. All must be the same length.
    pub fn from_points(rows: Vec<Vec<i32>>) -> Option<Self> {
        let frames = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != frames) {
            return None;
        }
        Some(Self {
            points: rows.len(),
            frames,
            samples: rows.into_iter().flatten().collect(),
        })
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Samples for touch point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.points()`.
    pub fn point(&self, index: usize) -> &[i32] {
        assert!(index < self.points, "point {index} out of range");
        let start = index * self.frames;
        &self.samples[start..start + self.frames]
    }

    /// # Panics
    ///
    /// Panics if `index >= self.points()`.
    pub fn point_mut(&mut self, index: usize) -> &mut [i32] {
        assert!(index < self.points, "point {index} out of range");
        let start = index * self.frames;
        &mut self.samples[start..start + self.frames]
    }

    /// Iterate over touch points in order.
    pub fn iter_points(&self) -> impl Iterator<Item = &[i32]> {
        // chunks(0) panics. A zero-frame window yields one empty slice per point.
        let frames = self.frames;
        self.samples
            .chunks(frames.max(1))
            .chain(std::iter::repeat(&[][..]))
            .take(self.points)
    }

    /// Bytes this frame occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        self.samples.len() * INT_FIELD_LEN
    }
}

/// Write every sample of `frame` as consecutive Int Fields.
pub fn write_samples(
    buf: &mut [u8],
    offset: usize,
    frame: &SampleFrame,
) -> Result<usize, CodecError> {
    frame
        .samples
        .iter()
        .try_fold(offset, |offset, &sample| write_int(buf, offset, sample))
}

/// Read `points × frames` Int Field samples starting at `offset`.
///
/// The whole span is checked before the frame is allocated.
pub fn read_samples(
    buf: &[u8],
    offset: usize,
    points: usize,
    frames: usize,
) -> Result<(usize, SampleFrame), CodecError> {
    let capacity = buf.len();
    let needed = points
        .checked_mul(frames)
        .and_then(|n| n.checked_mul(INT_FIELD_LEN))
        .unwrap_or(usize::MAX);
    if offset.checked_add(needed).map_or(true, |end| end > capacity) {
        return Err(CodecError::OutOfBounds {
            offset,
            needed,
            capacity,
        });
    }

    let mut frame = SampleFrame::new(points, frames);
    let mut offset = offset;
    for slot in frame.samples.iter_mut() {
        let (next, sample) = read_int(buf, offset)?;
        *slot = sample;
        offset = next;
    }
    Ok((offset, frame))
}

/// Map a sample to the unit range.
pub fn sample_to_unit(sample: i32) -> f64 {
    f64::from(sample) / SAMPLE_SCALE
}

/// Map a unit-range value to a sample: `round(value * 32768)`, clamped to
/// the 16-bit signed domain. NaN maps to silence.
pub fn unit_to_sample(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    (value * SAMPLE_SCALE)
        .round()
        .clamp(f64::from(SAMPLE_MIN), f64::from(SAMPLE_MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_major_layout() {
        let frame = SampleFrame::from_points(vec![vec![1, 2, 3], vec![-4, -5, -6]]).unwrap();
        assert_eq!(frame.points(), 2);
        assert_eq!(frame.frames(), 3);
        assert_eq!(frame.point(1), &[-4, -5, -6]);

        let mut buf = [0u8; 24];
        assert_eq!(write_samples(&mut buf, 0, &frame).unwrap(), 24);
        assert_eq!(read_int(&buf, 12).unwrap().1, -4);
        assert_eq!(read_samples(&buf, 0, 2, 3).unwrap(), (24, frame));
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(SampleFrame::from_points(vec![vec![1, 2], vec![3]]).is_none());
    }

    #[test]
    fn point_mut_writes_in_place() {
        let mut frame = SampleFrame::new(3, 4);
        frame.point_mut(2).copy_from_slice(&[9, 8, 7, 6]);
        assert_eq!(frame.point(0), &[0; 4]);
        assert_eq!(frame.point(2), &[9, 8, 7, 6]);
        assert_eq!(frame.iter_points().count(), 3);
    }

    #[test]
    fn zero_frame_window_still_has_points() {
        let frame = SampleFrame::new(2, 0);
        let rows: Vec<&[i32]> = frame.iter_points().collect();
        assert_eq!(rows, vec![&[][..], &[][..]]);
        assert_eq!(frame.encoded_len(), 0);
    }

    #[test]
    fn short_buffer_is_out_of_bounds() {
        let mut buf = [0u8; 10];
        let frame = SampleFrame::new(1, 3);
        assert!(matches!(
            write_samples(&mut buf, 0, &frame),
            Err(CodecError::OutOfBounds { offset: 8, .. })
        ));
        assert_eq!(
            read_samples(&buf, 0, 1, 3),
            Err(CodecError::OutOfBounds {
                offset: 0,
                needed: 12,
                capacity: 10
            })
        );
    }

    #[test]
    fn huge_frame_request_fails_before_allocating() {
        let buf = [0u8; 16];
        assert!(matches!(
            read_samples(&buf, 4, usize::MAX / 2, 3),
            Err(CodecError::OutOfBounds {
                offset: 4,
                needed: usize::MAX,
                capacity: 16
            })
        ));
        assert!(matches!(
            read_samples(&buf, 4, 1 << 20, 1 << 20),
            Err(CodecError::OutOfBounds { capacity: 16, .. })
        ));
    }

    #[test]
    #[should_panic]
    fn point_past_the_last_panics() {
        let frame = SampleFrame::new(2, 0);
        let _ = frame.point(2);
    }

    #[test]
    fn unit_conversion() {
        assert_eq!(sample_to_unit(-32768), -1.0);
        assert_eq!(sample_to_unit(16384), 0.5);
        assert_eq!(unit_to_sample(0.5), 16384);
        assert_eq!(unit_to_sample(-1.0), -32768);
        assert_eq!(unit_to_sample(1.0), 32767);
        assert_eq!(unit_to_sample(0.000_01), 0);
        assert_eq!(unit_to_sample(0.000_02), 1);
        assert_eq!(unit_to_sample(f64::NAN), 0);
        assert_eq!(unit_to_sample(f64::NEG_INFINITY), -32768);
    }
}
