//! tts-chunker - text files to spoken-word audio
//!
//! Splits a text file into fixed-size chunks, synthesizes each chunk to
//! speech, joins the chunk audio in order into one file and optionally
//! opens it with the system player.

pub mod artifact;
pub mod audio;
pub mod chunk;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod playback;
pub mod progress;
pub mod speech;

pub use error::{ChunkerError, Result};
pub use pipeline::{Pipeline, PipelineConfig, RunReport, RunState};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "tts-chunker";
