//! Settings loading tests
//!
//! Checks that settings files load and that command line values win over
//! the file, which wins over the built-in defaults.

use std::fs;
use std::path::PathBuf;
use tts_chunker::config::{Config, ConvertOverrides};
use tts_chunker::ChunkerError;

const SETTINGS: &str = "\
[convert]
lang = de
output = buch.wav
chunk_size = 2048
artifact_dir = /tmp/chunks
play = true

[speech]
engine = espeak
espeak_path = /opt/espeak/bin/espeak-ng
rate = 70
volume = 100
";

#[test]
fn test_settings_file_values() {
    let config = Config::parse(SETTINGS).unwrap();

    assert_eq!(config.lang(), "de");
    assert_eq!(config.output(), PathBuf::from("buch.wav"));
    assert_eq!(config.chunk_size(), 2048);
    assert_eq!(config.artifact_dir(), PathBuf::from("/tmp/chunks"));
    assert!(config.play());

    let speech = config.speech();
    assert_eq!(speech.espeak_path.as_deref(), Some("/opt/espeak/bin/espeak-ng"));
    assert_eq!(speech.rate, 70);
    assert_eq!(speech.volume, 100);
}

#[test]
fn test_file_values_used_without_overrides() {
    let config = Config::parse(SETTINGS).unwrap();
    let run = config
        .resolve("book.txt", &ConvertOverrides::default())
        .unwrap();

    assert_eq!(run.source_path, PathBuf::from("book.txt"));
    assert_eq!(run.language_code, "de");
    assert_eq!(run.output_path, PathBuf::from("buch.wav"));
    assert_eq!(run.chunk_size_bytes, 2048);
    assert_eq!(run.artifact_root, PathBuf::from("/tmp/chunks"));
    assert!(run.play_after_convert);
}

#[test]
fn test_command_line_overrides_file() {
    let config = Config::parse(SETTINGS).unwrap();
    let overrides = ConvertOverrides {
        lang: Some("fr".to_string()),
        output: Some(PathBuf::from("livre.mp3")),
        chunk_size: Some(5),
        artifact_dir: Some(PathBuf::from("scratch")),
        play: false,
    };
    let run = config.resolve("book.txt", &overrides).unwrap();

    assert_eq!(run.language_code, "fr");
    assert_eq!(run.output_path, PathBuf::from("livre.mp3"));
    assert_eq!(run.chunk_size_bytes, 5);
    assert_eq!(run.artifact_root, PathBuf::from("scratch"));
    // --play can only switch playback on
    assert!(run.play_after_convert);
}

#[test]
fn test_defaults_without_file() {
    let run = Config::empty()
        .resolve("book.txt", &ConvertOverrides::default())
        .unwrap();

    assert_eq!(run.language_code, "en");
    assert_eq!(run.output_path, PathBuf::from("output.mp3"));
    assert_eq!(run.chunk_size_bytes, 1024);
    assert_eq!(run.artifact_root, PathBuf::from("audio_chunks"));
    assert!(!run.play_after_convert);
}

#[test]
fn test_zero_chunk_size_override_rejected() {
    let overrides = ConvertOverrides {
        chunk_size: Some(0),
        ..ConvertOverrides::default()
    };
    assert!(matches!(
        Config::empty().resolve("book.txt", &overrides),
        Err(ChunkerError::Config(_))
    ));
}

#[test]
fn test_write_default_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.cfg");

    Config::write_default(&path).unwrap();
    let config = Config::load(Some(path.as_path())).unwrap();

    assert_eq!(config.path(), Some(path.as_path()));
    assert_eq!(config.lang(), "en");
    assert_eq!(config.chunk_size(), 1024);
    assert_eq!(config.engine(), "espeak");

    // A second write must not clobber the file
    fs::write(&path, "[convert]\nlang = it\n").unwrap();
    assert!(Config::write_default(&path).is_err());
    assert_eq!(Config::load(Some(path.as_path())).unwrap().lang(), "it");
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.cfg");
    assert!(matches!(
        Config::load(Some(missing.as_path())),
        Err(ChunkerError::IniParse(_))
    ));
}
