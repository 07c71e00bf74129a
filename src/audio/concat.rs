//! Ordered concatenation of chunk artifacts into the final output

use super::codec::{self, OutputFormat, PcmAudio};
use crate::artifact::ChunkArtifact;
use crate::{ChunkerError, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The finished, combined audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub total_duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: usize,
}

/// Joins decoded chunk audio in index order and writes one output file
pub struct AudioConcatenator {
    format: OutputFormat,
}

impl AudioConcatenator {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Concatenator for the format implied by `output`'s extension
    pub fn for_output(output: &Path) -> Result<Self> {
        OutputFormat::from_path(output).map(Self::new)
    }

    /// Decode every artifact in order and write the joined audio to `output`
    ///
    /// Stops at the first artifact that cannot be decoded or does not match
    /// the format of the ones before it. `output` is only written when
    /// every artifact decoded.
    pub fn concatenate(&self, artifacts: &[ChunkArtifact], output: &Path) -> Result<OutputArtifact> {
        let mut combined = PcmAudio::empty();

        for artifact in artifacts {
            let segment = codec::decode_file(&artifact.path)?;
            debug!(
                "Appending chunk {} ({:.2}s)",
                artifact.index,
                segment.duration().as_secs_f64()
            );

            combined
                .append(&segment)
                .map_err(|reason| ChunkerError::Decode {
                    artifact: artifact.path.clone(),
                    reason,
                })?;
        }

        codec::encode_file(&combined, output, self.format)?;
        info!("Audio content written to {:?}", output);

        Ok(OutputArtifact {
            path: output.to_path_buf(),
            total_duration: combined.duration(),
            sample_rate: combined.sample_rate(),
            channels: combined.channels(),
            frames: combined.frames(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_chunk(dir: &Path, index: usize, rate: u32, samples: &[i16]) -> ChunkArtifact {
        let path = dir.join(format!("chunk_{}.wav", index));
        let audio = PcmAudio::new(rate, 1, samples.to_vec());
        codec::encode_file(&audio, &path, OutputFormat::Wav).unwrap();
        ChunkArtifact { index, path }
    }

    #[test]
    fn test_concatenates_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![
            write_chunk(dir.path(), 0, 8000, &[1, 2, 3]),
            write_chunk(dir.path(), 1, 8000, &[4, 5]),
        ];
        let output = dir.path().join("out.wav");

        let result = AudioConcatenator::for_output(&output)
            .unwrap()
            .concatenate(&artifacts, &output)
            .unwrap();

        assert_eq!(result.frames, 5);
        assert_eq!(result.sample_rate, 8000);
        assert_eq!(codec::decode_file(&output).unwrap().samples(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_mismatched_rate_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![
            write_chunk(dir.path(), 0, 8000, &[1, 2, 3]),
            write_chunk(dir.path(), 1, 16000, &[4, 5]),
        ];
        let output = dir.path().join("out.wav");

        let err = AudioConcatenator::new(OutputFormat::Wav)
            .concatenate(&artifacts, &output)
            .unwrap_err();

        match err {
            ChunkerError::Decode { artifact, .. } => assert_eq!(artifact, artifacts[1].path),
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_unknown_output_extension() {
        assert!(matches!(
            AudioConcatenator::for_output(Path::new("book.flac")),
            Err(ChunkerError::Encode { .. })
        ));
    }
}
