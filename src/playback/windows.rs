//! Opener for Windows
//!
//! `start` is a cmd.exe builtin, so it runs through `cmd /C`. The empty
//! string is the window title `start` expects before a quoted path.

use super::{run_opener, Player};
use crate::Result;
use log::debug;
use std::path::Path;
use std::process::Command;

/// Opens files via `cmd /C start`
pub struct WindowsOpener;

impl Player for WindowsOpener {
    fn name(&self) -> &str {
        "start"
    }

    fn open(&self, path: &Path) -> Result<()> {
        debug!("Opening {:?} with cmd /C start", path);

        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        run_opener(cmd, "cmd /C start")
    }
}
