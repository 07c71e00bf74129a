//! Opener for Unix-like systems

use super::{run_opener, Player};
use crate::platform::on_path;
use crate::Result;
use log::debug;
use std::path::Path;
use std::process::Command;

/// Opens files via `xdg-open`, `open` (macOS) or `wslview` (WSL)
pub struct PosixOpener {
    program: String,
}

impl PosixOpener {
    /// Pick the opener program for this host
    ///
    /// On WSL `wslview` hands the file to the Windows side; without it
    /// `xdg-open` is tried like on any Linux.
    pub fn for_host(macos: bool, wsl: bool) -> Self {
        let program = if macos {
            "open"
        } else if wsl && on_path("wslview") {
            "wslview"
        } else {
            "xdg-open"
        };

        Self::with_program(program)
    }

    /// Use a specific opener command
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Player for PosixOpener {
    fn name(&self) -> &str {
        &self.program
    }

    fn open(&self, path: &Path) -> Result<()> {
        debug!("Opening {:?} with {}", path, self.program);

        let mut cmd = Command::new(&self.program);
        cmd.arg(path);
        run_opener(cmd, &self.program)
    }
}
