//! Waveform transform — the numeric codec behind each point record.
//!
//! The real compression engine lives outside this crate. It plugs in through
//! [`WaveformTransform`], which is exactly two pure functions: waveform in,
//! bits plus extrema out, and back. Anything cross-process or cross-language
//! is an adapter implementing this trait.
//!
//! [`DeltaModulator`] is a small in-crate implementation so the bridge can run
//! end to end without an engine attached.

use crate::point::PointRecord;
use crate::samples::{sample_to_unit, unit_to_sample, SampleFrame};

/// The numeric encode/decode pair.
///
/// `encode` receives unit-range floats for one touch point. `decode` receives
/// the record read off the wire (whose `bits` already have their true length)
/// and must return one value per frame.
pub trait WaveformTransform: Send + Sync {
    fn encode(&self, waveform: &[f64]) -> Result<PointRecord, TransformError>;

    fn decode(&self, record: &PointRecord) -> Result<Vec<f64>, TransformError>;
}

impl<T: WaveformTransform + ?Sized> WaveformTransform for Box<T> {
    fn encode(&self, waveform: &[f64]) -> Result<PointRecord, TransformError> {
        (**self).encode(waveform)
    }

    fn decode(&self, record: &PointRecord) -> Result<Vec<f64>, TransformError> {
        (**self).decode(record)
    }
}

// ── Pipelines ─────────────────────────────────────────────────────────────────

/// Encode every touch point of `frame`.
pub fn compress_frame<T: WaveformTransform + ?Sized>(
    transform: &T,
    frame: &SampleFrame,
) -> Result<Vec<PointRecord>, TransformError> {
    let mut unit = Vec::with_capacity(frame.frames());
    frame
        .iter_points()
        .map(|samples| {
            unit.clear();
            unit.extend(samples.iter().copied().map(sample_to_unit));
            transform.encode(&unit)
        })
        .collect()
}

/// Decode every record back into `frames` samples per touch point.
pub fn expand_points<T: WaveformTransform + ?Sized>(
    transform: &T,
    points: &[PointRecord],
    frames: usize,
) -> Result<SampleFrame, TransformError> {
    let mut frame = SampleFrame::new(points.len(), frames);
    for (index, record) in points.iter().enumerate() {
        let waveform = transform.decode(record)?;
        if waveform.len() != frames {
            return Err(TransformError::FrameCountMismatch {
                point: index,
                expected: frames,
                actual: waveform.len(),
            });
        }
        for (slot, value) in frame.point_mut(index).iter_mut().zip(waveform) {
            *slot = unit_to_sample(value);
        }
    }
    Ok(frame)
}

// ── Delta modulation ──────────────────────────────────────────────────────────

/// Default number of steps spanning a segment's min..max range.
pub const DEFAULT_STEPS: f64 = 16.0;

/// One-bit delta modulation.
///
/// Each bit says whether the tracking value steps up or down. The tracker
/// starts at the midpoint of the segment and is clamped to its range. The
/// side arrays carry the positions and values of the segment minimum and
/// maximum: they fix the step size and are restored exactly on decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaModulator {
    steps: f64,
}

impl Default for DeltaModulator {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
        }
    }
}

impl DeltaModulator {
    /// `steps` must be positive and finite; anything else falls back to the
    /// default.
    pub fn new(steps: f64) -> Self {
        if steps.is_finite() && steps > 0.0 {
            Self { steps }
        } else {
            Self::default()
        }
    }

    fn tracker(&self, min: f64, max: f64) -> impl FnMut(bool) -> f64 {
        let step = (max - min) / self.steps;
        let mut level = (min + max) / 2.0;
        move |up| {
            level = (if up { level + step } else { level - step }).clamp(min, max);
            level
        }
    }
}

impl WaveformTransform for DeltaModulator {
    fn encode(&self, waveform: &[f64]) -> Result<PointRecord, TransformError> {
        if let Some(index) = waveform.iter().position(|v| !v.is_finite()) {
            return Err(TransformError::NonFiniteSample { index });
        }
        let Some(&first) = waveform.first() else {
            return Ok(PointRecord::default());
        };

        let (mut lo, mut hi) = ((0usize, first), (0usize, first));
        for (i, &v) in waveform.iter().enumerate() {
            if v < lo.1 {
                lo = (i, v);
            }
            if v > hi.1 {
                hi = (i, v);
            }
        }

        let mut step = self.tracker(lo.1, hi.1);
        let mut level = (lo.1 + hi.1) / 2.0;
        let bits = waveform
            .iter()
            .map(|&v| {
                let up = v >= level;
                level = step(up);
                u8::from(up)
            })
            .collect();

        Ok(PointRecord {
            bits,
            extremum_index: vec![lo.0 as f64, hi.0 as f64],
            extremum_value: vec![lo.1, hi.1],
        })
    }

    fn decode(&self, record: &PointRecord) -> Result<Vec<f64>, TransformError> {
        if record.bits.is_empty() {
            return Ok(Vec::new());
        }
        let &[a, b] = record.extremum_value.as_slice() else {
            return Err(TransformError::MissingExtrema {
                found: record.extremum_value.len(),
            });
        };
        if record.extremum_index.len() != record.extremum_value.len() {
            return Err(TransformError::MissingExtrema {
                found: record.extremum_index.len(),
            });
        }
        if !(a.is_finite() && b.is_finite()) {
            return Err(TransformError::NonFiniteExtremum);
        }

        let mut step = self.tracker(a.min(b), a.max(b));
        let mut out: Vec<f64> = record.bits.iter().map(|&bit| step(bit != 0)).collect();

        let len = out.len();
        for (&position, &value) in record.extremum_index.iter().zip(&record.extremum_value) {
            let in_range = position.is_finite()
                && position >= 0.0
                && position.fract() == 0.0
                && position < len as f64;
            if !in_range {
                return Err(TransformError::ExtremumOutOfRange { position, len });
            }
            out[position as usize] = value;
        }
        Ok(out)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("sample {index} is not finite")]
    NonFiniteSample { index: usize },

    #[error("extremum value is not finite")]
    NonFiniteExtremum,

    #[error("expected a min/max extremum pair, found {found} entries")]
    MissingExtrema { found: usize },

    #[error("extremum position {position} is outside a {len}-sample waveform")]
    ExtremumOutOfRange { position: f64, len: usize },

    #[error("point {point} decoded to {actual} frames, expected {expected}")]
    FrameCountMismatch {
        point: usize,
        expected: usize,
        actual: usize,
    },

    #[error("transform engine failed: {0}")]
    Engine(String),
}
