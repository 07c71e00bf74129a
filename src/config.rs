//! Configuration management
//!
//! Settings live in an INI file (`~/.tts-chunker.cfg` by default). Command
//! line flags take precedence over the file, and the file takes precedence
//! over the built-in defaults.

use crate::pipeline::PipelineConfig;
use crate::{ChunkerError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_OUTPUT: &str = "output.mp3";
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_ARTIFACT_DIR: &str = "audio_chunks";
pub const DEFAULT_ENGINE: &str = "espeak";

/// Speech engine tuning passed to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    /// Explicit espeak-ng executable, otherwise searched on PATH
    pub espeak_path: Option<String>,
    /// Speech rate (0-100, 50 is normal)
    pub rate: u8,
    /// Speech volume (0-100)
    pub volume: u8,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            espeak_path: None,
            rate: 50,
            volume: 80,
        }
    }
}

/// Values given on the command line, each overriding the settings file
#[derive(Debug, Clone, Default)]
pub struct ConvertOverrides {
    pub lang: Option<String>,
    pub output: Option<PathBuf>,
    pub chunk_size: Option<usize>,
    pub artifact_dir: Option<PathBuf>,
    pub play: bool,
}

/// Persistent converter settings
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Where the settings came from, if anywhere
    path: Option<PathBuf>,
}

impl Config {
    /// Load settings
    ///
    /// An explicit `path` must exist. Without one, the default file is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => {
                    debug!("No settings file, using defaults");
                    Ok(Self::empty())
                }
            },
        }
    }

    /// Load settings from a specific INI file
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = Ini::load_from_file(path)
            .map_err(|e| ChunkerError::IniParse(format!("Failed to load {:?}: {}", path, e)))?;

        Ok(Self {
            ini,
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse settings from INI text
    pub fn parse(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text)
            .map_err(|e| ChunkerError::IniParse(format!("Failed to parse config: {}", e)))?;

        Ok(Self { ini, path: None })
    }

    /// Settings with nothing configured
    pub fn empty() -> Self {
        Self {
            ini: Ini::new(),
            path: None,
        }
    }

    /// Default settings file path (~/.tts-chunker.cfg)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tts-chunker.cfg"))
    }

    /// Settings file this config was read from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write a settings file holding every default value
    pub fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(ChunkerError::Config(format!(
                "Refusing to overwrite existing settings file {:?}",
                path
            )));
        }

        info!("Writing default settings to {:?}", path);
        Self::default_config()
            .write_to_file(path)
            .map_err(|e| ChunkerError::Config(format!("Failed to write config: {}", e)))
    }

    fn default_config() -> Ini {
        let defaults = SpeechSettings::default();
        let mut ini = Ini::new();

        ini.with_section(Some("convert"))
            .set("lang", DEFAULT_LANG)
            .set("output", DEFAULT_OUTPUT)
            .set("chunk_size", DEFAULT_CHUNK_SIZE.to_string())
            .set("artifact_dir", DEFAULT_ARTIFACT_DIR)
            .set("play", "false");

        ini.with_section(Some("speech"))
            .set("engine", DEFAULT_ENGINE)
            .set("rate", defaults.rate.to_string())
            .set("volume", defaults.volume.to_string());

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Synthesis language code
    pub fn lang(&self) -> String {
        self.get_string("convert", "lang", DEFAULT_LANG)
    }

    /// Where the combined audio is written; the extension picks the codec
    pub fn output(&self) -> PathBuf {
        PathBuf::from(self.get_string("convert", "output", DEFAULT_OUTPUT))
    }

    /// Bytes of text per synthesis request
    ///
    /// Non-positive values fall back to the default.
    pub fn chunk_size(&self) -> usize {
        self.get_int("convert", "chunk_size", DEFAULT_CHUNK_SIZE as i64)
            .try_into()
            .ok()
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Base directory for per-run chunk artifacts
    pub fn artifact_dir(&self) -> PathBuf {
        PathBuf::from(self.get_string("convert", "artifact_dir", DEFAULT_ARTIFACT_DIR))
    }

    /// Open the result with the system player after converting?
    pub fn play(&self) -> bool {
        self.get_bool("convert", "play", false)
    }

    /// Speech engine name
    pub fn engine(&self) -> String {
        self.get_string("speech", "engine", DEFAULT_ENGINE)
    }

    /// Backend tuning; out-of-range values fall back to defaults
    pub fn speech(&self) -> SpeechSettings {
        let defaults = SpeechSettings::default();
        let percent = |key: &str, default: u8| -> u8 {
            self.get_int("speech", key, default as i64)
                .try_into()
                .ok()
                .filter(|&v: &u8| v <= 100)
                .unwrap_or(default)
        };

        SpeechSettings {
            espeak_path: self
                .ini
                .get_from(Some("speech"), "espeak_path")
                .map(str::to_string)
                .filter(|p| !p.trim().is_empty()),
            rate: percent("rate", defaults.rate),
            volume: percent("volume", defaults.volume),
        }
    }

    /// Combine these settings with command line values into a run config
    pub fn resolve(
        &self,
        source_path: impl Into<PathBuf>,
        overrides: &ConvertOverrides,
    ) -> Result<PipelineConfig> {
        let chunk_size = overrides.chunk_size.unwrap_or_else(|| self.chunk_size());

        PipelineConfig::new(
            source_path,
            overrides.lang.clone().unwrap_or_else(|| self.lang()),
            overrides.output.clone().unwrap_or_else(|| self.output()),
            chunk_size,
            overrides.play || self.play(),
        )
        .map(|config| {
            config.with_artifact_root(
                overrides
                    .artifact_dir
                    .clone()
                    .unwrap_or_else(|| self.artifact_dir()),
            )
        })
    }
}
