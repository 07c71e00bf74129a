//! Error types for tts-chunker

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tts-chunker
#[derive(Error, Debug)]
pub enum ChunkerError {
    #[error("Cannot read source text {path:?}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Source text {path:?} is empty, nothing to synthesize")]
    EmptyInput { path: PathBuf },

    #[error("Speech synthesis failed for chunk {index}: {cause}")]
    Synthesis { index: usize, cause: String },

    #[error("Cannot write chunk artifact {path:?}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot decode chunk artifact {artifact:?}: {reason}")]
    Decode { artifact: PathBuf, reason: String },

    #[error("Cannot encode output {path:?}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Speech backend error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for tts-chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_message_names_chunk() {
        let err = ChunkerError::Synthesis {
            index: 7,
            cause: "engine exited".into(),
        };
        assert_eq!(
            err.to_string(),
            "Speech synthesis failed for chunk 7: engine exited"
        );
    }
}
