//! Per-dependency lock records.
//!
//! A lock record marks the version of a dependency that was last installed
//! successfully. It lives at `<destination root>/<key>.lock` and its entire
//! content is the version string: no structure, no trailing newline, no
//! metadata. A missing file means the dependency was never installed.
//!
//! ```text
//! vendor/
//! ├── fgputil.lock          # "v1.2.3"
//! ├── fgputil-core-1.0.jar
//! └── fgputil-util-1.0.jar
//! ```
//!
//! Records are compared with exact string equality. `"v1.2.3"` and
//! `"v1.2.3\n"` are different versions, so a hand-edited lock file with a
//! trailing newline triggers a reinstall. Bytes that are not valid UTF-8 are
//! decoded lossily; such a record never matches a configured version.
//!
//! Writes go through [`atomic_write`] so a crash mid-write never leaves a
//! truncated record behind. There is no file locking; concurrent installers
//! on one destination root are unsupported.

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::LOCK_FILE_EXTENSION;
use crate::utils::fs::{atomic_write, read_file_opt};

/// The version string of the last successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    version: String,
}

impl LockRecord {
    /// Creates a record for `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// The recorded version, verbatim.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether this record was written for exactly `version`.
    #[must_use]
    pub fn matches(&self, version: &str) -> bool {
        self.version == version
    }

    /// Reads the record at `path`, or `None` if no lock file exists.
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let content = read_file_opt(path)
            .await
            .with_context(|| format!("Failed to read lock file {}", path.display()))?;
        Ok(content.map(|bytes| match String::from_utf8(bytes) {
            Ok(version) => Self::new(version),
            Err(e) => {
                tracing::warn!("Lock file {} is not valid UTF-8", path.display());
                Self::new(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }))
    }

    /// Replaces the lock file at `path` with this record.
    pub async fn save(&self, path: &Path) -> Result<()> {
        atomic_write(path, self.version.as_bytes())
            .await
            .with_context(|| format!("Failed to write lock file {}", path.display()))?;
        tracing::debug!("Wrote lock file {} ({})", path.display(), self.version);
        Ok(())
    }
}

impl fmt::Display for LockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Lock file path for dependency `key` under `root`.
#[must_use]
pub fn lock_file_path(root: &Path, key: &str) -> PathBuf {
    root.join(format!("{key}.{LOCK_FILE_EXTENSION}"))
}
