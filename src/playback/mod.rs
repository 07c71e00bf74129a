//! Opening the finished audio with the system's default application
//!
//! One [`Player`] implementation per platform capability, chosen once at
//! startup by [`create_player`]. Playback problems never fail a
//! conversion; callers report them and carry on.

pub mod posix;
pub mod windows;

use crate::platform::Platform;
use crate::{ChunkerError, Result};
use log::info;
use std::path::Path;
use std::process::{Command, Stdio};

pub use posix::PosixOpener;
pub use windows::WindowsOpener;

/// Hands a file to the OS default-application opener
pub trait Player {
    /// Opener name for logs
    fn name(&self) -> &str;

    /// Open `path`; returns once the opener command has exited
    fn open(&self, path: &Path) -> Result<()>;
}

/// Create the opener for the current platform
pub fn create_player() -> Result<Box<dyn Player>> {
    player_for(&Platform::detect())
}

/// Create the opener for `platform`
pub fn player_for(platform: &Platform) -> Result<Box<dyn Player>> {
    let player: Box<dyn Player> = match platform {
        Platform::Posix { macos, wsl } => Box::new(PosixOpener::for_host(*macos, *wsl)),
        Platform::Windows => Box::new(WindowsOpener),
        Platform::Unsupported(os) => {
            return Err(ChunkerError::UnsupportedPlatform(os.clone()));
        }
    };

    info!("Using {} to open audio", player.name());
    Ok(player)
}

/// Run an opener command to completion, mapping failures to playback errors
pub(crate) fn run_opener(mut cmd: Command, name: &str) -> Result<()> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let status = cmd
        .status()
        .map_err(|e| ChunkerError::Playback(format!("Failed to start {}: {}", name, e)))?;

    if !status.success() {
        return Err(ChunkerError::Playback(format!(
            "{} exited with {}",
            name, status
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform() {
        let err = player_for(&Platform::Unsupported("plan9".to_string()))
            .err()
            .unwrap();
        assert!(matches!(err, ChunkerError::UnsupportedPlatform(ref os) if os == "plan9"));
    }

    #[test]
    fn test_player_per_platform() {
        let windows = player_for(&Platform::Windows).unwrap();
        assert_eq!(windows.name(), "start");

        let mac = player_for(&Platform::Posix {
            macos: true,
            wsl: false,
        })
        .unwrap();
        assert_eq!(mac.name(), "open");
    }

    #[test]
    fn test_missing_opener_is_playback_error() {
        let err = run_opener(
            Command::new("surely-no-such-opener-tts-chunker"),
            "surely-no-such-opener-tts-chunker",
        )
        .unwrap_err();
        assert!(matches!(err, ChunkerError::Playback(_)));
    }
}
