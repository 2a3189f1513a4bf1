//! Idempotent fetch-build-install pipeline for one source dependency.
//!
//! [`DependencyInstaller`] decides from a lock record whether a dependency is
//! current, and if not clones it, builds it, and moves the resulting artifacts
//! into a destination root (a vendor directory for libraries, a bin directory
//! for tools).
//!
//! # State machine
//!
//! ```text
//! CheckLock ──(lock == version)──────────────────────────────▶ Skip
//!     │
//!     └──(missing / different)──▶ Download ─▶ Clean ─▶ Install ─▶ WriteLock ─▶ Done
//!                                    │          │         │           │
//!                                    └──────────┴─────────┴───────────┴──▶ Failed
//! ```
//!
//! - **CheckLock** compares the lock file content to the configured version
//!   with exact string equality. A match ends the run with no side effects.
//! - **Download** creates the destination root if needed, removes a leftover
//!   working clone from an earlier failed run, clones the source, and checks
//!   out the target unless it was cloned at the target branch or names the
//!   default branch.
//! - **Clean** deletes files directly in the destination root that match the
//!   dependency's artifact filter. The lock file is never deleted here.
//! - **Install** optionally rewrites `-SNAPSHOT` versions in the clone's poms,
//!   builds the clone (or a configured subdirectory), moves every
//!   selected artifact into the destination root, overwriting same-named
//!   files, then deletes the working clone.
//! - **WriteLock** records the version. It is always the last step, so the
//!   lock file only ever names a version whose install fully succeeded.
//!
//! Any error moves the run to **Failed**: nothing further happens and nothing
//! is rolled back. A failure during Install can leave the destination cleaned
//! but not repopulated. The lock file still holds its old value, so the next
//! run starts over from Download.
//!
//! There is no locking. Two installers must never share a destination root.

pub mod spec;

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::build::{BuildArtifact, BuildTool, patch_pom_versions};
use crate::core::DepforgeError;
use crate::git::{Git, repo_dir_name};
use crate::lockfile::LockRecord;
use crate::utils::fs::{
    check_not_file, delete_file, delete_recursive, ensure_dir, list_children, move_file,
};

pub use spec::{ArtifactFilter, CloneMode, DependencySpec, DestinationKind};

/// States of one install run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// Read and compare the lock record.
    CheckLock,
    /// Already current; terminal.
    Skip,
    /// Clone the source.
    Download,
    /// Remove stale artifacts from the destination root.
    Clean,
    /// Build and move artifacts.
    Install,
    /// Record the installed version.
    WriteLock,
    /// Installed; terminal.
    Done,
    /// Aborted on error; terminal.
    Failed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckLock => "CheckLock",
            Self::Skip => "Skip",
            Self::Download => "Download",
            Self::Clean => "Clean",
            Self::Install => "Install",
            Self::WriteLock => "WriteLock",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful [`DependencyInstaller::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The lock record already matched; nothing was touched.
    UpToDate {
        /// Installed version
        version: String,
    },
    /// The dependency was (re)installed.
    Installed {
        /// Newly installed version
        version: String,
        /// Version recorded before this run, if any
        previous: Option<String>,
        /// Installed artifact paths in the destination root
        artifacts: Vec<PathBuf>,
    },
}

/// Lock state of a dependency as seen by CheckLock, without acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    /// Configured version
    pub configured: String,
    /// Version in the lock file, if present
    pub installed: Option<String>,
}

impl LockStatus {
    /// Whether an install run would do any work.
    #[must_use]
    pub fn needs_install(&self) -> bool {
        self.installed.as_deref() != Some(self.configured.as_str())
    }

    /// Short human-readable state.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match &self.installed {
            None => "not installed",
            Some(v) if v == &self.configured => "up to date",
            Some(_) => "version change pending",
        }
    }
}

/// Working data carried between states of one run.
#[derive(Debug, Default)]
struct InstallRun {
    previous: Option<String>,
    repo_dir: Option<PathBuf>,
    artifacts: Vec<PathBuf>,
}

/// Drives the install state machine for one [`DependencySpec`].
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    spec: DependencySpec,
    git: Git,
    build_tool: BuildTool,
}

impl DependencyInstaller {
    /// Installer for `spec` using the system `git` and the spec's build tool.
    #[must_use]
    pub fn new(spec: DependencySpec) -> Self {
        let build_tool = spec.tool().clone();
        Self {
            spec,
            git: Git::new(),
            build_tool,
        }
    }

    /// Replaces the git client.
    #[must_use]
    pub fn with_git(mut self, git: Git) -> Self {
        self.git = git;
        self
    }

    /// Replaces the build tool.
    #[must_use]
    pub fn with_build_tool(mut self, tool: BuildTool) -> Self {
        self.build_tool = tool;
        self
    }

    /// The dependency this installer manages.
    #[must_use]
    pub const fn spec(&self) -> &DependencySpec {
        &self.spec
    }

    /// Brings the destination root up to the configured version.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any state. The lock file is left as
    /// it was before the run.
    pub async fn install(&self) -> Result<InstallOutcome> {
        let name = self.spec.name();
        let mut run = InstallRun::default();
        let mut state = InstallState::CheckLock;

        tracing::info!(target: "installer", "Checking {}", name);

        loop {
            let step = match state {
                InstallState::CheckLock => self.check_lock(&mut run).await,
                InstallState::Download => self.download(&mut run).await,
                InstallState::Clean => self.clean().await,
                InstallState::Install => self.install_artifacts(&mut run).await,
                InstallState::WriteLock => self.write_lock().await,
                InstallState::Skip | InstallState::Done | InstallState::Failed => break,
            };

            match step {
                Ok(next) => {
                    tracing::debug!(target: "installer", "{}: {} -> {}", name, state, next);
                    state = next;
                }
                Err(e) => {
                    tracing::debug!(
                        target: "installer",
                        "{}: {} -> {}",
                        name,
                        state,
                        InstallState::Failed
                    );
                    return Err(e.context(format!("Failed to install {name}")));
                }
            }
        }

        let version = self.spec.version().to_string();
        match state {
            InstallState::Skip => Ok(InstallOutcome::UpToDate {
                version,
            }),
            InstallState::Done => {
                tracing::info!(target: "installer", "Installed {} {}", name, version);
                Ok(InstallOutcome::Installed {
                    version,
                    previous: run.previous,
                    artifacts: run.artifacts,
                })
            }
            other => Err(DepforgeError::Other {
                message: format!("Installer for {name} stopped in state {other}"),
            }
            .into()),
        }
    }

    /// Reports the CheckLock decision without acting on it.
    pub async fn status(&self) -> Result<LockStatus> {
        let record = LockRecord::load(&self.spec.lock_file()).await?;
        Ok(LockStatus {
            configured: self.spec.version().to_string(),
            installed: record.map(|r| r.version().to_string()),
        })
    }

    /// Deletes everything in the destination root that belongs to this
    /// dependency, plus its lock file and any leftover working clone.
    ///
    /// Matching directories are deleted recursively. Returns the removed paths.
    pub async fn uninstall(&self) -> Result<Vec<PathBuf>> {
        let name = self.spec.name();
        let dest = self.spec.destination();
        check_not_file(dest).await?;

        let mut removed = Vec::new();
        for child in list_children(dest).await? {
            if self.spec.filter().matches(&file_name(&child)) {
                delete_recursive(&child)
                    .await
                    .with_context(|| format!("Failed to uninstall {name}"))?;
                removed.push(child);
            }
        }

        for extra in [self.spec.lock_file(), self.working_clone_dir()?] {
            if !removed.contains(&extra) && tokio::fs::symlink_metadata(&extra).await.is_ok() {
                delete_recursive(&extra)
                    .await
                    .with_context(|| format!("Failed to uninstall {name}"))?;
                removed.push(extra);
            }
        }

        tracing::info!(
            target: "installer",
            "Removed {} entries for {} from {}",
            removed.len(),
            name,
            dest.display()
        );
        Ok(removed)
    }

    async fn check_lock(&self, run: &mut InstallRun) -> Result<InstallState> {
        check_not_file(self.spec.destination()).await?;
        let record = LockRecord::load(&self.spec.lock_file()).await?;
        let version = self.spec.version();

        match record {
            Some(record) if record.matches(version) => {
                tracing::info!(target: "installer", "Already up to date. Skipping.");
                Ok(InstallState::Skip)
            }
            Some(record) => {
                tracing::info!(
                    target: "installer",
                    "Version change detected ({} -> {}). Updating.",
                    record.version(),
                    version
                );
                run.previous = Some(record.version().to_string());
                Ok(InstallState::Download)
            }
            None => {
                tracing::info!(target: "installer", "Not found. Installing.");
                Ok(InstallState::Download)
            }
        }
    }

    async fn download(&self, run: &mut InstallRun) -> Result<InstallState> {
        let dest = self.spec.destination();
        let url = self.spec.url();
        let target = self.spec.target();
        let mode = self.spec.mode();

        ensure_dir(dest).await?;

        let leftover = self.working_clone_dir()?;
        if tokio::fs::symlink_metadata(&leftover).await.is_ok() {
            tracing::debug!(
                target: "installer",
                "Removing leftover working clone {}",
                leftover.display()
            );
            delete_recursive(&leftover).await?;
        }

        tracing::info!(target: "installer", "Downloading {} {}", self.spec.name(), target);

        let branch_clone = mode.at_branch && !target.is_default();
        let repo_dir = match (mode.shallow, branch_clone) {
            (false, false) => self.git.clone(url, dest).await?,
            (true, false) => self.git.shallow_clone(url, dest).await?,
            (false, true) => self.git.clone_branch(url, dest, target).await?,
            (true, true) => self.git.shallow_clone_branch(url, dest, target).await?,
        };

        if !branch_clone {
            self.git.checkout_if_needed(&repo_dir, target).await?;
        }

        run.repo_dir = Some(repo_dir);
        Ok(InstallState::Clean)
    }

    async fn clean(&self) -> Result<InstallState> {
        let dest = self.spec.destination();
        let lock_file = self.spec.lock_file();

        for child in list_children(dest).await? {
            if child == lock_file || !is_file(&child).await? {
                continue;
            }
            if self.spec.filter().matches(&file_name(&child)) {
                tracing::debug!(target: "installer", "Removing stale artifact {}", child.display());
                delete_file(&child)
                    .await
                    .with_context(|| format!("Failed to clean {}", dest.display()))?;
            }
        }
        Ok(InstallState::Install)
    }

    async fn install_artifacts(&self, run: &mut InstallRun) -> Result<InstallState> {
        let dest = self.spec.destination();
        let repo_dir = match &run.repo_dir {
            Some(dir) => dir.clone(),
            None => self.working_clone_dir()?,
        };
        let build_dir = match self.spec.subdir() {
            Some(subdir) => repo_dir.join(subdir),
            None => repo_dir.clone(),
        };

        if self.spec.patches_pom_versions() {
            patch_pom_versions(&repo_dir, self.spec.version())
                .await
                .with_context(|| format!("Failed to patch poms of {}", self.spec.name()))?;
        }

        tracing::info!(target: "installer", "Building {}", self.spec.name());
        self.build_tool.build(&build_dir).await?;

        let artifacts = self.selected_artifacts(&build_dir)?;
        if artifacts.is_empty() {
            tracing::warn!(
                target: "installer",
                "Build of {} produced no artifacts in {}",
                self.spec.name(),
                build_dir.display()
            );
        }

        for artifact in artifacts {
            let file_name = match self.spec.installed_name() {
                Some(name) => name.to_string(),
                None => artifact.file_name(),
            };
            let installed = dest.join(file_name);
            move_file(artifact.path(), &installed)
                .await
                .with_context(|| format!("Failed to install {}", artifact.path().display()))?;
            tracing::info!(target: "installer", "Installed {}", installed.display());
            run.artifacts.push(installed);
        }

        delete_recursive(&repo_dir)
            .await
            .with_context(|| format!("Failed to remove working clone {}", repo_dir.display()))?;

        Ok(InstallState::WriteLock)
    }

    async fn write_lock(&self) -> Result<InstallState> {
        LockRecord::new(self.spec.version()).save(&self.spec.lock_file()).await?;
        Ok(InstallState::Done)
    }

    /// Discovered artifacts after `artifact_select`, collected before any move.
    fn selected_artifacts(&self, build_dir: &Path) -> Result<Vec<BuildArtifact>> {
        let mut selected = Vec::new();
        for artifact in self.build_tool.find_artifacts(build_dir) {
            let artifact = artifact?;
            let keep = self.spec.selection().is_none_or(|f| f.matches(&artifact.file_name()));
            if keep {
                selected.push(artifact);
            }
        }

        if let Some(install_name) = self.spec.installed_name() {
            if selected.len() != 1 {
                return Err(DepforgeError::Other {
                    message: format!(
                        "Expected exactly one artifact to install as {install_name}, found {}",
                        selected.len()
                    ),
                }
                .into());
            }
        }
        Ok(selected)
    }

    fn working_clone_dir(&self) -> Result<PathBuf> {
        Ok(self.spec.destination().join(repo_dir_name(self.spec.url())?))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

async fn is_file(path: &Path) -> Result<bool> {
    let meta = tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| DepforgeError::fs("inspect", path, e))?;
    Ok(meta.is_file())
}
