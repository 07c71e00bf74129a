//! Temporary per-chunk audio artifacts

pub mod cleaner;
pub mod store;

pub use cleaner::{clean, CleanupReport};
pub use store::{ChunkArtifact, ChunkArtifactStore};
