//! File system utilities used by the installer pipeline.
//!
//! All functions are async (`tokio::fs`) so the installer can await them
//! alongside process execution. Failures are reported as
//! [`DepforgeError::FileSystem`] so the caller can tell which path and which
//! operation failed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use depforge::utils::fs::{ensure_dir, atomic_write};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("vendor")).await?;
//! atomic_write(Path::new("vendor/fgputil.lock"), b"v1.2.3").await?;
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::core::DepforgeError;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// - [`DepforgeError::NotADirectory`] if the path exists but is not a directory
/// - [`DepforgeError::FileSystem`] if creation fails
pub async fn ensure_dir(path: &Path) -> Result<()> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DepforgeError::NotADirectory {
            path: path.display().to_string(),
        }
        .into()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path)
                .await
                .map_err(|e| DepforgeError::fs("create directory", path, e))?;
            tracing::debug!("Created directory {}", path.display());
            Ok(())
        }
        Err(e) => Err(DepforgeError::fs("inspect", path, e).into()),
    }
}

/// Returns `Ok(())` when `path` is absent or a directory.
///
/// Unlike [`ensure_dir`] this never creates anything.
pub async fn check_not_file(path: &Path) -> Result<()> {
    match fs::metadata(path).await {
        Ok(meta) if !meta.is_dir() => Err(DepforgeError::NotADirectory {
            path: path.display().to_string(),
        }
        .into()),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DepforgeError::fs("inspect", path, e).into()),
    }
}

/// Lists the direct children of `root`.
///
/// A missing root yields an empty list.
pub async fn list_children(root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DepforgeError::fs("list directory", root, e).into()),
    };

    let mut children = Vec::new();
    while let Some(entry) =
        entries.next_entry().await.map_err(|e| DepforgeError::fs("list directory", root, e))?
    {
        children.push(entry.path());
    }
    Ok(children)
}

/// Deletes a single file.
pub async fn delete_file(path: &Path) -> Result<()> {
    tracing::debug!("Deleting file {}", path.display());
    fs::remove_file(path).await.map_err(|e| DepforgeError::fs("delete file", path, e))?;
    Ok(())
}

/// Deletes a file, or a directory and everything beneath it.
///
/// Missing paths are not an error.
pub async fn delete_recursive(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(DepforgeError::fs("inspect", path, e).into()),
    };

    if meta.is_dir() {
        tracing::debug!("Deleting directory {}", path.display());
        fs::remove_dir_all(path).await.map_err(|e| DepforgeError::fs("delete directory", path, e))?;
        Ok(())
    } else {
        delete_file(path).await
    }
}

/// Moves `src` to `dst`, replacing any existing file at `dst`.
///
/// Falls back to copy-then-delete when a rename crosses file systems.
pub async fn move_file(src: &Path, dst: &Path) -> Result<()> {
    tracing::debug!("Moving {} to {}", src.display(), dst.display());

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(src, dst).await.map_err(|e| DepforgeError::fs("copy file to", dst, e))?;
            delete_file(src).await
        }
        Err(e) => Err(DepforgeError::fs("move file to", dst, e).into()),
    }
}

/// Reads a file's bytes, returning `None` when it does not exist.
pub async fn read_file_opt(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DepforgeError::fs("read file", path, e).into()),
    }
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// The content is written to a sibling `.tmp` file, synced, then renamed over
/// the target, so readers see either the old content or the new content.
pub async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| DepforgeError::fs("create temp file", &temp_path, e))?;
        file.write_all(content)
            .await
            .map_err(|e| DepforgeError::fs("write temp file", &temp_path, e))?;
        file.sync_all().await.map_err(|e| DepforgeError::fs("sync", &temp_path, e))?;
    }

    fs::rename(&temp_path, path).await.map_err(|e| DepforgeError::fs("replace", path, e))?;
    Ok(())
}
