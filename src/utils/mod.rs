//! Cross-cutting utilities: file system helpers and tool lookup.

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, delete_recursive, ensure_dir, list_children, move_file};
pub use platform::{command_exists, get_git_command, is_windows};
