//! tactile-core — wire format, bit packing and packet codec for compressed
//! tactile waveforms. The bridge daemon and any peer implementation depend
//! on this crate.

pub mod bitpack;
pub mod config;
pub mod field;
pub mod packet;
pub mod point;
pub mod samples;
pub mod transform;
pub mod wire;

pub use packet::{decode_packet, encode_packet, Packet, Trailing};
pub use point::PointRecord;
pub use samples::SampleFrame;
pub use transform::{DeltaModulator, TransformError, WaveformTransform};
pub use wire::{CodecError, Malformed, Role};
