//! What to install and where: the per-dependency install description.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::build::BuildTool;
use crate::git::GitTarget;
use crate::lockfile::lock_file_path;

/// Which kind of destination root a dependency installs into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    /// Runtime library jars (`vendor-dir`).
    #[default]
    Vendor,
    /// Build-time tool archives (`bin-dir`).
    Bin,
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vendor => f.write_str("vendor"),
            Self::Bin => f.write_str("bin"),
        }
    }
}

/// Predicate over file names.
///
/// Used to pick which files in a destination root belong to a dependency,
/// and which discovered build artifacts to keep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactFilter {
    /// Name starts with the given text.
    Prefix(String),
    /// Name ends with the given text.
    Suffix(String),
    /// Name equals the given text.
    Exact(String),
}

impl ArtifactFilter {
    /// Whether `file_name` satisfies the filter (case-sensitive).
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => file_name.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => file_name.ends_with(suffix.as_str()),
            Self::Exact(name) => file_name == name,
        }
    }
}

impl fmt::Display for ArtifactFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(p) => write!(f, "{p}*"),
            Self::Suffix(s) => write!(f, "*{s}"),
            Self::Exact(n) => f.write_str(n),
        }
    }
}

/// How the source repository is cloned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneMode {
    /// Clone with `--depth 1`.
    pub shallow: bool,
    /// Pass the target to `git clone --branch` instead of checking it out
    /// afterwards. Ignored for default-branch targets.
    pub at_branch: bool,
}

/// Everything the installer needs to know about one dependency.
///
/// Built once from configuration and passed to
/// [`DependencyInstaller::new`](super::DependencyInstaller::new).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    name: String,
    key: String,
    url: String,
    target: GitTarget,
    destination_kind: DestinationKind,
    destination: PathBuf,
    build_subdir: Option<PathBuf>,
    artifact_filter: ArtifactFilter,
    artifact_select: Option<ArtifactFilter>,
    install_name: Option<String>,
    clone_mode: CloneMode,
    build_tool: BuildTool,
    patch_pom_versions: bool,
}

impl DependencySpec {
    /// Describes dependency `name` cloned from `url` at `version` into `destination`.
    ///
    /// Defaults: the lock key is `name`, files prefixed with `name` belong to
    /// the dependency, every artifact is kept under its own name, the default
    /// branch is fully cloned and then checked out, and the build is Maven.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        version: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            artifact_filter: ArtifactFilter::Prefix(name.clone()),
            name,
            url: url.into(),
            target: GitTarget::new(version),
            destination_kind: DestinationKind::Vendor,
            destination: destination.into(),
            build_subdir: None,
            artifact_select: None,
            install_name: None,
            clone_mode: CloneMode::default(),
            build_tool: BuildTool::maven(),
            patch_pom_versions: false,
        }
    }

    /// Sets the key used for the lock file name.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Marks the destination as a vendor or bin root.
    #[must_use]
    pub const fn destination_kind(mut self, kind: DestinationKind) -> Self {
        self.destination_kind = kind;
        self
    }

    /// Builds in a subdirectory of the clone instead of its root.
    #[must_use]
    pub fn build_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.build_subdir = Some(subdir.into());
        self
    }

    /// Sets which destination files belong to this dependency.
    #[must_use]
    pub fn artifact_filter(mut self, filter: ArtifactFilter) -> Self {
        self.artifact_filter = filter;
        self
    }

    /// Keeps only discovered artifacts matching `filter`.
    #[must_use]
    pub fn artifact_select(mut self, filter: ArtifactFilter) -> Self {
        self.artifact_select = Some(filter);
        self
    }

    /// Installs the single selected artifact under `file_name`.
    #[must_use]
    pub fn install_name(mut self, file_name: impl Into<String>) -> Self {
        self.install_name = Some(file_name.into());
        self
    }

    /// Sets the clone strategy.
    #[must_use]
    pub const fn clone_mode(mut self, mode: CloneMode) -> Self {
        self.clone_mode = mode;
        self
    }

    /// Sets the build tool.
    #[must_use]
    pub fn build_tool(mut self, tool: BuildTool) -> Self {
        self.build_tool = tool;
        self
    }

    /// Rewrites `x.y.z-SNAPSHOT` versions in the clone's poms to the target
    /// version before building.
    #[must_use]
    pub const fn pom_version_patch(mut self, enabled: bool) -> Self {
        self.patch_pom_versions = enabled;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock key.
    #[must_use]
    pub fn lock_key(&self) -> &str {
        &self.key
    }

    /// Source repository URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Configured target; its name is the version recorded in the lock file.
    #[must_use]
    pub const fn target(&self) -> &GitTarget {
        &self.target
    }

    /// Configured target version string.
    #[must_use]
    pub fn version(&self) -> &str {
        self.target.name()
    }

    /// Vendor or bin.
    #[must_use]
    pub const fn kind(&self) -> DestinationKind {
        self.destination_kind
    }

    /// Destination root directory.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// `<destination>/<key>.lock`.
    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        lock_file_path(&self.destination, &self.key)
    }

    /// Build subdirectory relative to the clone root, if any.
    #[must_use]
    pub fn subdir(&self) -> Option<&Path> {
        self.build_subdir.as_deref()
    }

    /// Predicate selecting this dependency's files in the destination root.
    #[must_use]
    pub const fn filter(&self) -> &ArtifactFilter {
        &self.artifact_filter
    }

    /// Predicate selecting which build artifacts to install.
    #[must_use]
    pub const fn selection(&self) -> Option<&ArtifactFilter> {
        self.artifact_select.as_ref()
    }

    /// Fixed installed file name, if any.
    #[must_use]
    pub fn installed_name(&self) -> Option<&str> {
        self.install_name.as_deref()
    }

    /// Clone strategy.
    #[must_use]
    pub const fn mode(&self) -> CloneMode {
        self.clone_mode
    }

    /// Build tool.
    #[must_use]
    pub const fn tool(&self) -> &BuildTool {
        &self.build_tool
    }

    /// Whether snapshot versions in poms are patched before the build.
    #[must_use]
    pub const fn patches_pom_versions(&self) -> bool {
        self.patch_pom_versions
    }
}
