//! Speech synthesis

pub mod backends;
pub mod synth;

pub use synth::{create_synth, Synthesizer, ENGINES};
