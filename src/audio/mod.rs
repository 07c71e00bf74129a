//! Audio codec access and concatenation

pub mod codec;
pub mod concat;

pub use codec::{OutputFormat, PcmAudio};
pub use concat::{AudioConcatenator, OutputArtifact};
