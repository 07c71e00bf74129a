//! Text-to-audio conversion pipeline
//!
//! A run walks through these states, strictly in order:
//!
//! `Idle → Chunking → Synthesizing(0..N) → Concatenating → CleaningUp →
//! (PlaybackAttempted) → Done`
//!
//! Any fatal error moves the run to `Failed`. Chunk artifacts are removed
//! only after the output has been written; on failure they stay in the
//! run directory for inspection.

use crate::artifact::{cleaner, ChunkArtifactStore, CleanupReport};
use crate::audio::{AudioConcatenator, OutputArtifact};
use crate::chunk::ChunkReader;
use crate::config::{DEFAULT_ARTIFACT_DIR, DEFAULT_CHUNK_SIZE};
use crate::playback::{create_player, Player};
use crate::progress::Progress;
use crate::speech::Synthesizer;
use crate::{ChunkerError, Result};
use log::{debug, info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Everything one conversion run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub source_path: PathBuf,
    pub language_code: String,
    pub output_path: PathBuf,
    pub chunk_size_bytes: usize,
    pub play_after_convert: bool,
    /// Directory holding each run's private artifact directory
    pub artifact_root: PathBuf,
}

impl PipelineConfig {
    pub fn new(
        source_path: impl Into<PathBuf>,
        language_code: impl Into<String>,
        output_path: impl Into<PathBuf>,
        chunk_size_bytes: usize,
        play_after_convert: bool,
    ) -> Result<Self> {
        if chunk_size_bytes == 0 {
            return Err(ChunkerError::Config(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }

        Ok(Self {
            source_path: source_path.into(),
            language_code: language_code.into(),
            output_path: output_path.into(),
            chunk_size_bytes,
            play_after_convert,
            artifact_root: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        })
    }

    /// Same config with default language, output and chunk size
    pub fn for_source(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            language_code: crate::config::DEFAULT_LANG.to_string(),
            output_path: PathBuf::from(crate::config::DEFAULT_OUTPUT),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            play_after_convert: false,
            artifact_root: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        }
    }

    pub fn with_artifact_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.artifact_root = root.into();
        self
    }
}

/// Which phase a failed run stopped in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SourceRead,
    EmptyInput,
    Synthesis,
    ArtifactWrite,
    Decode,
    Encode,
    Other,
}

impl From<&ChunkerError> for FailureKind {
    fn from(err: &ChunkerError) -> Self {
        match err {
            ChunkerError::SourceRead { .. } => FailureKind::SourceRead,
            ChunkerError::EmptyInput { .. } => FailureKind::EmptyInput,
            ChunkerError::Synthesis { .. } => FailureKind::Synthesis,
            ChunkerError::ArtifactWrite { .. } => FailureKind::ArtifactWrite,
            ChunkerError::Decode { .. } => FailureKind::Decode,
            ChunkerError::Encode { .. } => FailureKind::Encode,
            _ => FailureKind::Other,
        }
    }
}

/// Position of a run in its state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Chunking,
    Synthesizing(usize),
    Concatenating,
    CleaningUp,
    PlaybackAttempted,
    Done,
    Failed(FailureKind),
}

/// Outcome of a successful run
#[derive(Debug)]
pub struct RunReport {
    pub output: OutputArtifact,
    /// Number of chunks synthesized
    pub chunks: usize,
    pub bytes_processed: u64,
    pub cleanup: CleanupReport,
    /// Set when playback was requested and failed; the conversion still succeeded
    pub playback_error: Option<ChunkerError>,
}

/// Drives chunking, synthesis, concatenation, cleanup and playback
pub struct Pipeline {
    config: PipelineConfig,
    synth: Box<dyn Synthesizer>,
    player: Result<Box<dyn Player>>,
    show_progress: bool,
    state: RunState,
    run_dir: Option<PathBuf>,
}

impl Pipeline {
    /// New pipeline using the platform's default opener for playback
    pub fn new(config: PipelineConfig, synth: Box<dyn Synthesizer>) -> Self {
        let player = create_player();
        if let Err(e) = &player {
            debug!("No player available: {}", e);
        }

        Self {
            config,
            synth,
            player,
            show_progress: false,
            state: RunState::Idle,
            run_dir: None,
        }
    }

    /// Replace the platform opener
    pub fn with_player(mut self, player: Box<dyn Player>) -> Self {
        self.player = Ok(player);
        self
    }

    /// Draw a progress bar on stderr while synthesizing
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Directory of the most recent run's chunk artifacts
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }

    /// Convert the source text into the output audio file
    pub fn run(&mut self) -> Result<RunReport> {
        self.reset();
        let opened = ChunkReader::open(&self.config.source_path, self.config.chunk_size_bytes);
        let result = match opened {
            Ok(reader) => self.execute(reader),
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    /// Convert text from an already opened reader instead of `source_path`
    ///
    /// The reader's own chunk size is used.
    pub fn run_with_reader<R: Read>(&mut self, reader: ChunkReader<R>) -> Result<RunReport> {
        self.reset();
        let result = self.execute(reader);
        self.settle(result)
    }

    fn reset(&mut self) {
        self.state = RunState::Idle;
        self.run_dir = None;
    }

    fn settle(&mut self, result: Result<RunReport>) -> Result<RunReport> {
        match result {
            Ok(report) => Ok(report),
            Err(e) => {
                self.state = RunState::Failed(FailureKind::from(&e));
                debug!("Conversion failed: {}", e);
                if let Some(dir) = &self.run_dir {
                    warn!("Chunk artifacts left in {:?}", dir);
                }
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn execute<R: Read>(&mut self, reader: ChunkReader<R>) -> Result<RunReport> {
        // Resolve the output codec before doing any synthesis work
        let concatenator = AudioConcatenator::for_output(&self.config.output_path)?;

        self.transition(RunState::Chunking);
        let mut progress = Progress::new(reader.source_len(), self.show_progress);

        let mut store =
            ChunkArtifactStore::create(&self.config.artifact_root, self.synth.extension())?;
        self.run_dir = Some(store.run_dir().to_path_buf());

        info!(
            "Synthesizing {:?} with {} ({}), {} bytes per chunk",
            self.config.source_path,
            self.synth.name(),
            self.config.language_code,
            reader.chunk_size()
        );

        for chunk in reader {
            let chunk = chunk?;
            self.transition(RunState::Synthesizing(chunk.index));

            let audio = self
                .synth
                .synthesize(&chunk.text(), &self.config.language_code)
                .map_err(|e| ChunkerError::Synthesis {
                    index: chunk.index,
                    cause: e.to_string(),
                })?;

            let artifact = store.save(chunk.index, &audio)?;
            info!("Chunk {} created: {:?}", artifact.index, artifact.path);
            progress.println(format!(
                "Chunk {} created: {}",
                artifact.index,
                artifact.path.display()
            ));
            progress.advance(chunk.byte_length());
        }
        progress.finish();

        if store.is_empty() {
            cleaner::remove_run_dir(store.run_dir());
            self.run_dir = None;
            return Err(ChunkerError::EmptyInput {
                path: self.config.source_path.clone(),
            });
        }

        let artifacts = store.list();
        self.transition(RunState::Concatenating);
        let output = concatenator.concatenate(&artifacts, &self.config.output_path)?;

        self.transition(RunState::CleaningUp);
        let cleanup = cleaner::clean(&artifacts);
        if cleanup.is_complete() {
            cleaner::remove_run_dir(store.run_dir());
        } else {
            warn!(
                "{} chunk artifacts could not be removed from {:?}",
                cleanup.failed,
                store.run_dir()
            );
        }

        let playback_error = if self.config.play_after_convert {
            self.transition(RunState::PlaybackAttempted);
            self.play(&output.path).err()
        } else {
            None
        };

        self.transition(RunState::Done);
        Ok(RunReport {
            output,
            chunks: artifacts.len(),
            bytes_processed: progress.processed(),
            cleanup,
            playback_error,
        })
    }

    fn play(&self, path: &Path) -> Result<()> {
        let result = match &self.player {
            Ok(player) => player.open(path),
            Err(ChunkerError::UnsupportedPlatform(os)) => {
                Err(ChunkerError::UnsupportedPlatform(os.clone()))
            }
            Err(e) => Err(ChunkerError::Playback(e.to_string())),
        };

        if let Err(e) = &result {
            debug!("Playback failed: {}", e);
        }
        result
    }
}
