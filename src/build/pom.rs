//! Pom version patching for checkouts whose poms still reference unreleased
//! `-SNAPSHOT` versions.
//!
//! Some tagged releases ship module poms that point at `x.y.z-SNAPSHOT`
//! siblings which were never published, so the tag does not build as cloned.
//! Rewriting every such version to the checked-out version makes the modules
//! resolve each other from the local reactor.

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::{DirEntry, WalkDir};

use crate::constants::{POM_FILE_NAME, POM_SKIP_DIR, SNAPSHOT_VERSION_PATTERN};
use crate::core::DepforgeError;
use crate::utils::fs::atomic_write;

/// Skips hidden directories and `src/` trees below `root`.
fn is_pom_search_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && name != POM_SKIP_DIR
}

/// Finds every `pom.xml` under `root`, outside hidden directories and `src/`.
///
/// The result is sorted by path.
pub fn find_poms(root: &Path) -> Result<Vec<PathBuf>> {
    let mut poms = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(is_pom_search_dir) {
        let entry =
            entry.with_context(|| format!("Failed to scan {} for pom files", root.display()))?;
        if entry.file_type().is_file() && entry.file_name() == POM_FILE_NAME {
            tracing::debug!(target: "build", "Located pom file {}", entry.path().display());
            poms.push(entry.into_path());
        }
    }
    poms.sort();
    Ok(poms)
}

/// Replaces every `x.y.z-SNAPSHOT` in the poms under `root` with `version`.
///
/// Returns the poms that were rewritten. Poms without a snapshot version are
/// left untouched.
pub async fn patch_pom_versions(root: &Path, version: &str) -> Result<Vec<PathBuf>> {
    let snapshot = Regex::new(SNAPSHOT_VERSION_PATTERN)
        .context("Failed to compile the snapshot version pattern")?;
    let poms = find_poms(root)?;
    tracing::info!(target: "build", "Patching {} pom files", poms.len());

    let mut patched = Vec::new();
    for pom in poms {
        let content =
            fs::read_to_string(&pom).await.map_err(|e| DepforgeError::fs("read pom", &pom, e))?;
        let replaced = snapshot.replace_all(&content, NoExpand(version));
        if replaced == content {
            continue;
        }
        tracing::debug!(target: "build", "Patching {}", pom.display());
        atomic_write(&pom, replaced.as_bytes())
            .await
            .with_context(|| format!("Failed to patch {}", pom.display()))?;
        patched.push(pom);
    }
    Ok(patched)
}
