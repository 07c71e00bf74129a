//! Platform detection utilities

use std::env;
use std::fs;
use std::path::Path;

/// Host capability for opening files with the default application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Unix-like system; macOS and WSL have their own openers
    Posix { macos: bool, wsl: bool },
    Windows,
    /// Anything else, named by its OS string
    Unsupported(String),
}

impl Platform {
    /// Detect the platform this process runs on
    pub fn detect() -> Self {
        let os = env::consts::OS;
        let wsl = os == "linux" && is_wsl();
        Self::from_parts(env::consts::FAMILY, os, wsl)
    }

    /// Classify from `std::env::consts` style strings
    pub fn from_parts(family: &str, os: &str, wsl: bool) -> Self {
        match family {
            "unix" => Platform::Posix {
                macos: os == "macos",
                wsl,
            },
            "windows" => Platform::Windows,
            _ => Platform::Unsupported(if os.is_empty() {
                family.to_string()
            } else {
                os.to_string()
            }),
        }
    }
}

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks for WSL-specific indicators in /proc/version and environment variables.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    env::var("WSL_DISTRO_NAME").is_ok()
}

/// Is `program` an existing file in one of the PATH directories?
pub fn on_path(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| is_file(&dir.join(program))))
        .unwrap_or(false)
}

fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wsl() {
        // The actual result depends on the platform
        let _ = is_wsl();
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Platform::from_parts("unix", "linux", false),
            Platform::Posix {
                macos: false,
                wsl: false
            }
        );
        assert_eq!(
            Platform::from_parts("unix", "macos", false),
            Platform::Posix {
                macos: true,
                wsl: false
            }
        );
        assert_eq!(
            Platform::from_parts("windows", "windows", false),
            Platform::Windows
        );
        assert_eq!(
            Platform::from_parts("wasm", "unknown", false),
            Platform::Unsupported("unknown".to_string())
        );
    }

    #[test]
    fn test_detect_matches_build_target() {
        let platform = Platform::detect();
        if cfg!(unix) {
            assert!(matches!(platform, Platform::Posix { .. }));
        } else if cfg!(windows) {
            assert_eq!(platform, Platform::Windows);
        }
    }

    #[test]
    fn test_on_path_missing_program() {
        assert!(!on_path("surely-no-such-program-tts-chunker"));
    }
}
