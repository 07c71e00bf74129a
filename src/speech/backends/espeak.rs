//! espeak-ng backend
//!
//! Each chunk is synthesized by a short-lived `espeak-ng` process that reads
//! the text from stdin and writes a WAV file. The file is read back and
//! returned as the chunk's audio.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::config::SpeechSettings;
use crate::speech::Synthesizer;
use crate::{ChunkerError, Result};
use log::{debug, error};
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

/// espeak-ng subprocess backend
pub struct EspeakSynth {
    /// Path to espeak-ng
    espeak_path: String,

    /// Rate setting (0-100)
    rate: u8,

    /// Volume setting (0-100)
    volume: u8,
}

impl EspeakSynth {
    /// Create a new espeak-ng synthesizer
    ///
    /// Verifies the executable can be run
    pub fn new(settings: &SpeechSettings) -> Result<Self> {
        debug!("Creating espeak-ng backend");

        let espeak_path = Self::find_espeak(settings.espeak_path.as_deref())?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            espeak_path,
            rate: settings.rate,
            volume: settings.volume,
        })
    }

    /// Find espeak-ng executable
    fn find_espeak(explicit: Option<&str>) -> Result<String> {
        let paths: Vec<&str> = match explicit {
            Some(path) => vec![path],
            None => vec!["espeak-ng", "/usr/bin/espeak-ng", "/usr/local/bin/espeak-ng"],
        };

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(ChunkerError::Speech(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Convert rate (0-100) to espeak speed (80-450 wpm)
    fn rate_to_espeak_speed(rate: u8) -> u16 {
        // 0 = 80 wpm (very slow)
        // 50 = 265 wpm
        // 100 = 450 wpm (very fast)
        80 + ((rate.min(100) as u16) * 370 / 100)
    }

    /// Convert volume (0-100) to espeak amplitude (0-200)
    fn volume_to_espeak_amplitude(volume: u8) -> u8 {
        ((volume.min(100) as u16 * 200) / 100) as u8
    }
}

impl Synthesizer for EspeakSynth {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn extension(&self) -> &str {
        "wav"
    }

    fn synthesize(&mut self, text: &str, language: &str) -> Result<Vec<u8>> {
        let scratch = tempfile::Builder::new()
            .prefix("espeak-")
            .suffix(".wav")
            .tempfile()?;

        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(language);
        cmd.arg("-s")
            .arg(Self::rate_to_espeak_speed(self.rate).to_string());
        cmd.arg("-a")
            .arg(Self::volume_to_espeak_amplitude(self.volume).to_string());
        cmd.arg("-w").arg(scratch.path());
        cmd.arg("--stdin");
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::piped());

        debug!("Running espeak-ng for {} bytes of text", text.len());
        let mut child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn espeak-ng: {}", e);
            ChunkerError::Speech(format!("Failed to start espeak-ng: {}", e))
        })?;

        // Dropping stdin at the end of this block signals end of text.
        // A write error usually means espeak-ng already exited, so its
        // status and stderr are collected before the error is reported.
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| ChunkerError::Speech(format!("espeak-ng did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChunkerError::Speech(format!(
                "espeak-ng exited with {} ({})",
                output.status,
                stderr.trim()
            )));
        }

        if let Err(e) = sent {
            return Err(ChunkerError::Speech(format!("Failed to send text: {}", e)));
        }

        let audio = fs::read(scratch.path())?;
        if audio.is_empty() {
            return Err(ChunkerError::Speech(
                "espeak-ng produced no audio".to_string(),
            ));
        }

        debug!("espeak-ng produced {} bytes", audio.len());
        Ok(audio)
    }
}
