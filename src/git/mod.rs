//! Git client used to fetch dependency sources.
//!
//! [`Git`] wraps the system `git` binary through [`ExecCommand`], so every
//! invocation gets the same logging, stderr capture, and failure reporting as
//! any other external command. Only the small surface the installer needs is
//! exposed:
//!
//! - `git clone [--quiet] [--depth 1] [--branch <name>] <url>`, run in the
//!   parent directory of the clone
//! - `git checkout <target>`, run inside the cloned repository
//!
//! The clone directory name is derived from the URL's last path segment with
//! any `.git` suffix removed, matching what `git clone` itself picks.
//!
//! # Default-branch rule
//!
//! [`Git::checkout_if_needed`] skips the checkout when the target is named
//! `main` or `master` (see [`GitTarget::is_default`]). A fresh clone already
//! sits on the remote's default branch, so checking it out again is redundant
//! for repositories that follow either convention.
//!
//! # Examples
//!
//! ```rust,no_run
//! use depforge::git::{Git, GitTarget};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let git = Git::new();
//! let repo = git.clone("https://github.com/VEuPathDB/FgpUtil.git", Path::new("vendor")).await?;
//! git.checkout_if_needed(&repo, &GitTarget::new("v1.2.3")).await?;
//! # Ok(())
//! # }
//! ```

pub mod target;

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::{
    GIT_CHECKOUT, GIT_CLONE, GIT_FLAG_BRANCH, GIT_FLAG_DEPTH, GIT_FLAG_QUIET,
};
use crate::core::DepforgeError;
use crate::exec::{ExecCommand, ExecutionResult};
use crate::utils::platform::{command_exists, get_git_command};

pub use target::GitTarget;

/// Thin client over the `git` command line.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
    quiet: bool,
}

impl Default for Git {
    fn default() -> Self {
        Self::new()
    }
}

impl Git {
    /// Client for the platform's `git` binary with `--quiet` clones.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(get_git_command())
    }

    /// Client for a specific git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            quiet: true,
        }
    }

    /// Enables or disables `--quiet` on clones.
    #[must_use]
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// The executable this client spawns.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Fails with [`DepforgeError::GitNotFound`] if the executable is not on `PATH`.
    pub fn ensure_available(&self) -> Result<()> {
        if command_exists(&self.program) {
            Ok(())
        } else {
            Err(DepforgeError::GitNotFound.into())
        }
    }

    /// Full clone of the default branch of `url` into `parent_dir`.
    ///
    /// Returns the path of the new repository directory.
    pub async fn clone(&self, url: &str, parent_dir: &Path) -> Result<PathBuf> {
        self.clone_with(url, parent_dir, false, None).await
    }

    /// Depth-1 clone of the default branch of `url` into `parent_dir`.
    pub async fn shallow_clone(&self, url: &str, parent_dir: &Path) -> Result<PathBuf> {
        self.clone_with(url, parent_dir, true, None).await
    }

    /// Full clone of `url` that lands directly on `branch`.
    pub async fn clone_branch(
        &self,
        url: &str,
        parent_dir: &Path,
        branch: &GitTarget,
    ) -> Result<PathBuf> {
        self.clone_with(url, parent_dir, false, Some(branch)).await
    }

    /// Depth-1 clone of `url` that lands directly on `branch`.
    pub async fn shallow_clone_branch(
        &self,
        url: &str,
        parent_dir: &Path,
        branch: &GitTarget,
    ) -> Result<PathBuf> {
        self.clone_with(url, parent_dir, true, Some(branch)).await
    }

    /// Checks out `target` inside `repo_dir`.
    pub async fn checkout(&self, repo_dir: &Path, target: &GitTarget) -> Result<()> {
        let args = checkout_args(target);
        self.run(args, repo_dir, format!("Checking out {target}"))
            .await
            .with_context(|| format!("Failed to check out {} in {}", target, repo_dir.display()))?;
        Ok(())
    }

    /// Checks out `target` unless it names the default branch.
    ///
    /// Returns whether a checkout was performed.
    pub async fn checkout_if_needed(&self, repo_dir: &Path, target: &GitTarget) -> Result<bool> {
        if target.is_default() {
            tracing::debug!(
                target: "git",
                "Target {} is a default branch name, skipping checkout",
                target
            );
            return Ok(false);
        }
        self.checkout(repo_dir, target).await?;
        Ok(true)
    }

    async fn clone_with(
        &self,
        url: &str,
        parent_dir: &Path,
        shallow: bool,
        branch: Option<&GitTarget>,
    ) -> Result<PathBuf> {
        let repo_dir = parent_dir.join(repo_dir_name(url)?);
        let args = clone_args(self.quiet, shallow, branch, url);

        tracing::debug!(
            target: "git",
            "Cloning {} into {} (shallow: {}, branch: {})",
            url,
            repo_dir.display(),
            shallow,
            branch.map_or("<default>", GitTarget::name)
        );

        self.run(args, parent_dir, format!("Cloning {url}"))
            .await
            .with_context(|| format!("Failed to clone {url} into {}", parent_dir.display()))?;
        Ok(repo_dir)
    }

    async fn run(&self, args: Vec<String>, dir: &Path, context: String) -> Result<ExecutionResult> {
        ExecCommand::new(&self.program)
            .args(args)
            .current_dir(dir)
            .with_context(context)
            .execute()
            .await
            .map_err(|e| self.missing_git(e))
    }

    /// Replaces a "binary not found" spawn failure with [`DepforgeError::GitNotFound`].
    fn missing_git(&self, err: anyhow::Error) -> anyhow::Error {
        let not_found = matches!(
            err.downcast_ref::<DepforgeError>(),
            Some(DepforgeError::ProcessSpawn { source, .. }) if source.kind() == io::ErrorKind::NotFound
        );
        if not_found {
            anyhow::Error::from(DepforgeError::GitNotFound)
                .context(format!("`{}` could not be started", self.program))
        } else {
            err
        }
    }
}

fn clone_args(quiet: bool, shallow: bool, branch: Option<&GitTarget>, url: &str) -> Vec<String> {
    let mut args = vec![GIT_CLONE.to_string()];
    if quiet {
        args.push(GIT_FLAG_QUIET.to_string());
    }
    if shallow {
        args.push(GIT_FLAG_DEPTH.to_string());
        args.push("1".to_string());
    }
    if let Some(branch) = branch {
        args.push(GIT_FLAG_BRANCH.to_string());
        args.push(branch.name().to_string());
    }
    args.push(url.to_string());
    args
}

/// `checkout <target>`; no flags, whatever the quiet setting.
fn checkout_args(target: &GitTarget) -> Vec<String> {
    vec![GIT_CHECKOUT.to_string(), target.name().to_string()]
}

/// Directory name `git clone` creates for `url`.
///
/// The last path segment of the URL with a trailing `.git` removed. Trailing
/// slashes are ignored and `:` separates segments too, so scp-style URLs
/// (`git@host:org/repo.git`) and local paths work.
///
/// # Errors
///
/// Returns [`DepforgeError::ConfigError`] if no segment remains.
pub fn repo_dir_name(url: &str) -> Result<String> {
    let trimmed = url.trim_end_matches(['/', '\\']);
    let segment = trimmed.rsplit(['/', '\\', ':']).next().unwrap_or(trimmed);
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        return Err(DepforgeError::ConfigError {
            message: format!("Cannot derive a repository directory name from URL '{url}'"),
        }
        .into());
    }
    Ok(name.to_string())
}
