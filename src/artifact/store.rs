//! Numbered chunk artifacts for a single run

use crate::{ChunkerError, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One synthesized chunk persisted on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkArtifact {
    pub index: usize,
    pub path: PathBuf,
}

/// Stores chunk audio under a directory private to one run
///
/// Each run gets a fresh `run-*` directory below the artifact root, so
/// runs sharing a root never see each other's files.
pub struct ChunkArtifactStore {
    run_dir: PathBuf,
    extension: String,
    artifacts: BTreeMap<usize, ChunkArtifact>,
}

impl ChunkArtifactStore {
    /// Create a new run directory under `root`, creating `root` if absent
    ///
    /// The directory is kept on disk after the store drops; it is removed
    /// by the cleaner only after a successful run.
    pub fn create(root: &Path, extension: &str) -> Result<Self> {
        fs::create_dir_all(root).map_err(|source| ChunkerError::ArtifactWrite {
            path: root.to_path_buf(),
            source,
        })?;

        let run_dir = tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(root)
            .map_err(|source| ChunkerError::ArtifactWrite {
                path: root.to_path_buf(),
                source,
            })?
            .keep();

        info!("Chunk artifacts go to {:?}", run_dir);
        Ok(Self::in_dir(run_dir, extension))
    }

    /// Use an existing directory as the run directory
    pub fn in_dir(run_dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            run_dir: run_dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
            artifacts: BTreeMap::new(),
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Deterministic artifact path for a chunk index
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.run_dir
            .join(format!("chunk_{}.{}", index, self.extension))
    }

    /// Persist one chunk's audio
    ///
    /// Fails if the write fails or an artifact for `index` already exists.
    pub fn save(&mut self, index: usize, audio: &[u8]) -> Result<&ChunkArtifact> {
        let path = self.path_for(index);

        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)?;
            file.write_all(audio)?;
            file.sync_all()
        };

        if let Err(source) = write() {
            // Leave nothing half-written behind, unless the file was someone else's
            if source.kind() != std::io::ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&path);
            }
            return Err(ChunkerError::ArtifactWrite { path, source });
        }

        debug!("Saved chunk {} ({} bytes) to {:?}", index, audio.len(), path);
        let artifact = self
            .artifacts
            .entry(index)
            .or_insert(ChunkArtifact { index, path });
        Ok(artifact)
    }

    /// All saved artifacts, ordered by index
    pub fn list(&self) -> Vec<ChunkArtifact> {
        self.artifacts.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_ordered_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkArtifactStore::in_dir(dir.path(), "wav");

        store.save(2, b"two").unwrap();
        store.save(0, b"zero").unwrap();
        store.save(1, b"one").unwrap();

        let indices: Vec<_> = store.list().iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(fs::read(store.path_for(0)).unwrap(), b"zero");
    }

    #[test]
    fn test_paths_are_deterministic() {
        let store = ChunkArtifactStore::in_dir("/tmp/run-x", ".mp3");
        assert_eq!(store.path_for(3), PathBuf::from("/tmp/run-x/chunk_3.mp3"));
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkArtifactStore::in_dir(dir.path(), "wav");

        store.save(0, b"first").unwrap();
        let err = store.save(0, b"second").unwrap_err();
        assert!(matches!(err, ChunkerError::ArtifactWrite { .. }));
        assert_eq!(fs::read(store.path_for(0)).unwrap(), b"first");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_runs_get_separate_directories() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("audio_chunks");

        let a = ChunkArtifactStore::create(&nested, "wav").unwrap();
        let b = ChunkArtifactStore::create(&nested, "wav").unwrap();

        assert!(nested.is_dir());
        assert_ne!(a.run_dir(), b.run_dir());
        assert_ne!(a.path_for(0), b.path_for(0));
    }

    #[test]
    fn test_write_failure_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkArtifactStore::in_dir(dir.path().join("missing"), "wav");

        let err = store.save(0, b"audio").unwrap_err();
        assert!(matches!(err, ChunkerError::ArtifactWrite { .. }));
        assert!(store.is_empty());
    }
}
