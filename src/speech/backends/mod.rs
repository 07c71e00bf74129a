//! Speech engine backends

// espeak-ng subprocess writing WAV
pub mod espeak;
