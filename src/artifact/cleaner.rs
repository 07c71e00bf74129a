//! Best-effort removal of chunk artifacts

use super::ChunkArtifact;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Artifacts deleted
    pub removed: usize,
    /// Artifacts that could not be deleted
    pub failed: usize,
}

impl CleanupReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Delete every artifact, logging and skipping individual failures
pub fn clean(artifacts: &[ChunkArtifact]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for artifact in artifacts {
        match fs::remove_file(&artifact.path) {
            Ok(()) => {
                debug!("Removed chunk artifact {:?}", artifact.path);
                report.removed += 1;
            }
            Err(e) => {
                warn!(
                    "Could not remove chunk artifact {} at {:?}: {}",
                    artifact.index, artifact.path, e
                );
                report.failed += 1;
            }
        }
    }

    report
}

/// Remove a run directory once it is empty
///
/// Anything left inside (a failed deletion, a stray file) keeps it alive.
pub fn remove_run_dir(run_dir: &Path) {
    if let Err(e) = fs::remove_dir(run_dir) {
        debug!("Leaving run directory {:?} in place: {}", run_dir, e);
    }
}
