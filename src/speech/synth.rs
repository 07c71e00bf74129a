//! Speech synthesizer abstraction
//!
//! The converter treats the speech engine as an opaque service: a chunk of
//! text and a language code go in, encoded audio bytes come out.

use crate::config::SpeechSettings;
use crate::{ChunkerError, Result};
use log::info;

/// Text-to-speech engine producing encoded audio
pub trait Synthesizer {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// File extension of the container returned by [`Synthesizer::synthesize`]
    ///
    /// Chunk artifacts are saved with this extension so the decoder can
    /// probe them.
    fn extension(&self) -> &str;

    /// Convert `text` to audio in `language`
    ///
    /// The language code is passed through unchanged; only the engine
    /// decides whether it is valid.
    fn synthesize(&mut self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// Engine names accepted by [`create_synth`]
pub const ENGINES: &[&str] = &["espeak"];

/// Create the synthesizer named `engine`
///
/// Backend availability is checked here so a missing engine is reported
/// before any chunk is read.
pub fn create_synth(engine: &str, settings: &SpeechSettings) -> Result<Box<dyn Synthesizer>> {
    match engine {
        "espeak" | "espeak-ng" => {
            info!("Trying espeak-ng backend...");
            use super::backends::espeak::EspeakSynth;

            let synth = EspeakSynth::new(settings)?;
            info!("✓ Successfully initialized espeak-ng backend");
            Ok(Box::new(synth))
        }
        other => Err(ChunkerError::Speech(format!(
            "Unknown speech engine '{}'. Available engines: {}",
            other,
            ENGINES.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_engine() {
        let err = create_synth("festival", &SpeechSettings::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("festival"));
        assert!(err.to_string().contains("espeak"));
    }
}
