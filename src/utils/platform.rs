//! Platform helpers for locating external tools.

use std::path::PathBuf;

/// Returns `true` when compiled for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the platform-specific Git command name.
///
/// - `"git.exe"` on Windows
/// - `"git"` on Unix-like systems
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Checks whether `cmd` resolves to an executable on `PATH`.
///
/// Absolute and relative paths are checked directly.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Resolves `cmd` to the full path of the executable that would be spawned.
#[must_use]
pub fn resolve_command(cmd: &str) -> Option<PathBuf> {
    which::which(cmd).ok()
}
