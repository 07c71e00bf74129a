//! tts-chunker main entry point
//!
//! Parses the command line, merges it with the settings file, and runs one
//! conversion. Fatal errors exit with status 1; a failed playback is only
//! reported.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use tts_chunker::config::{Config, ConvertOverrides};
use tts_chunker::speech::create_synth;
use tts_chunker::Pipeline;

/// Convert a text file to speech, chunk by chunk
#[derive(Parser, Debug)]
#[command(name = "tts-chunker", version, about)]
struct Cli {
    /// Path to the input text file
    source_path: Option<PathBuf>,

    /// Language code passed to the speech engine (default: en)
    #[arg(long)]
    lang: Option<String>,

    /// Output audio file; .mp3 or .wav (default: output.mp3)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Open the audio with the system player after converting
    #[arg(long)]
    play: bool,

    /// Bytes of text per synthesis request (default: 1024)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: Option<u64>,

    /// Speech engine (default: espeak)
    #[arg(long)]
    engine: Option<String>,

    /// Directory for temporary chunk audio (default: audio_chunks)
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Settings file (default: ~/.tts-chunker.cfg when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a default settings file and exit
    #[arg(long)]
    init_config: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Write debug logs to tts-chunker.log
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    if cli.debug {
        // Debug mode: write to tts-chunker.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("tts-chunker.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open tts-chunker.log for debug logging: {}", e);
                eprintln!("Continuing with debug logging to stderr...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .init();
            }
        }

        info!(
            "{} version {} starting (debug mode)",
            tts_chunker::APP_NAME,
            tts_chunker::VERSION
        );
    } else {
        // Normal mode: warnings and errors on stderr, RUST_LOG may override
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Warn)
            .parse_default_env()
            .init();
    }

    if let Err(e) = run(cli) {
        debug!("Fatal error: {:?}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.init_config {
        let path = match cli.config {
            Some(path) => path,
            None => Config::default_path().context("Cannot locate home directory")?,
        };
        Config::write_default(&path)?;
        println!("Default settings written to {}", path.display());
        return Ok(());
    }

    let source_path = cli
        .source_path
        .context("Missing input text file (see --help)")?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(path) = config.path() {
        debug!("Settings loaded from {:?}", path);
    }

    let overrides = ConvertOverrides {
        lang: cli.lang,
        output: cli.output,
        chunk_size: cli
            .chunk_size
            .map(usize::try_from)
            .transpose()
            .context("Chunk size does not fit in memory")?,
        artifact_dir: cli.artifact_dir,
        play: cli.play,
    };
    let pipeline_config = config.resolve(source_path, &overrides)?;

    let engine = cli.engine.unwrap_or_else(|| config.engine());
    let synth = create_synth(&engine, &config.speech())
        .with_context(|| format!("Cannot start speech engine '{}'", engine))?;

    let show_progress = !cli.quiet && std::io::stderr().is_terminal();
    let mut pipeline = Pipeline::new(pipeline_config, synth).show_progress(show_progress);

    let report = pipeline.run().with_context(|| {
        format!(
            "Converting {} failed",
            pipeline.config().source_path.display()
        )
    })?;

    println!(
        "Audio content written to file \"{}\"",
        report.output.path.display()
    );
    info!(
        "{} chunks, {} bytes, {:.1}s of audio",
        report.chunks,
        report.bytes_processed,
        report.output.total_duration.as_secs_f64()
    );

    if let Some(e) = report.playback_error {
        eprintln!("Error playing audio: {}", e);
    }

    Ok(())
}
