//! Project configuration (`depforge.toml`).
//!
//! The configuration is loaded once by the binary and passed by reference to
//! whatever needs it. There is no global or lazily-initialized state.
//!
//! # Format
//!
//! ```toml
//! vendor-dir = "vendor"      # default "vendor"
//! bin-dir    = ".bin"        # default ".bin"
//!
//! [dependencies.fgputil]
//! preset  = "fgputil"
//! version = "v1.2.3"
//!
//! [dependencies.mytool]
//! url             = "https://github.com/org/mytool.git"
//! version         = "main"
//! destination     = "bin"
//! artifact-prefix = "mytool"
//! build-subdir    = "cli"
//! shallow         = true
//! clone-at-branch = true
//! artifact-select = "dependencies.jar"
//! install-name    = "mytool.jar"
//! build-command   = ["mvn", "clean", "install", "--quiet"]
//! patch-pom-versions = true   # rewrite x.y.z-SNAPSHOT in poms to `version`
//! ```
//!
//! The table key (`fgputil`, `mytool`) names the lock file
//! (`<root>/<key>.lock`) and selects the dependency on the command line.
//! Relative `vendor-dir` and `bin-dir` resolve against the directory holding
//! the configuration file.
//!
//! # Location
//!
//! The `--config` flag wins, then the `DEPFORGE_CONFIG` environment variable,
//! then `depforge.toml` in the current directory.

mod parser;
pub mod preset;

pub use parser::{parse_config, parse_config_str};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::build::BuildTool;
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_BIN_DIR, DEFAULT_VENDOR_DIR, LATEST_VERSION};
use crate::core::DepforgeError;
use crate::installer::{ArtifactFilter, CloneMode, DependencySpec, DestinationKind};

/// One `[dependencies.<key>]` table.
///
/// Every field is optional so a preset can supply the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DependencyConfig {
    /// Preset to take defaults from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Display name for log output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Git URL of the source repository
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Branch, tag, or commit; `latest` resolves the newest GitHub release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `vendor` or `bin`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<DestinationKind>,
    /// File name prefix identifying this dependency's installed files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_prefix: Option<String>,
    /// Subdirectory of the clone to build in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_subdir: Option<PathBuf>,
    /// Clone with `--depth 1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shallow: Option<bool>,
    /// Clone directly at the target branch or tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_at_branch: Option<bool>,
    /// Keep only build artifacts whose name ends with this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_select: Option<String>,
    /// Install the single selected artifact under this file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_name: Option<String>,
    /// Build program and arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_command: Option<Vec<String>>,
    /// Rewrite `-SNAPSHOT` versions in the clone's poms before building
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_pom_versions: Option<bool>,
}

impl DependencyConfig {
    /// Fills every unset field from `base`.
    #[must_use]
    pub fn or(self, base: Self) -> Self {
        Self {
            preset: self.preset.or(base.preset),
            name: self.name.or(base.name),
            url: self.url.or(base.url),
            version: self.version.or(base.version),
            destination: self.destination.or(base.destination),
            artifact_prefix: self.artifact_prefix.or(base.artifact_prefix),
            build_subdir: self.build_subdir.or(base.build_subdir),
            shallow: self.shallow.or(base.shallow),
            clone_at_branch: self.clone_at_branch.or(base.clone_at_branch),
            artifact_select: self.artifact_select.or(base.artifact_select),
            install_name: self.install_name.or(base.install_name),
            build_command: self.build_command.or(base.build_command),
            patch_pom_versions: self.patch_pom_versions.or(base.patch_pom_versions),
        }
    }

    /// Applies the preset (if any) and checks required fields.
    pub fn resolve(&self, key: &str) -> Result<ResolvedDependency> {
        let merged = match &self.preset {
            Some(name) => {
                let base = preset::preset(name).ok_or_else(|| DepforgeError::ConfigError {
                    message: format!(
                        "dependency '{key}' uses unknown preset '{name}' (known: {})",
                        preset::PRESET_NAMES.join(", ")
                    ),
                })?;
                self.clone().or(base)
            }
            None => self.clone(),
        };

        let url = required(merged.url, key, "url")?;
        let version = required(merged.version, key, "version")?;
        let artifact_prefix = required(merged.artifact_prefix.or_else(|| Some(key.to_string())), key, "artifact-prefix")?;
        let build_tool = match merged.build_command {
            Some(argv) => BuildTool::from_command_line(argv).map_err(|_| DepforgeError::ConfigError {
                message: format!("dependency '{key}' has an empty build-command"),
            })?,
            None => BuildTool::maven(),
        };

        Ok(ResolvedDependency {
            key: key.to_string(),
            name: merged.name.unwrap_or_else(|| key.to_string()),
            url,
            version,
            destination: merged.destination.unwrap_or_default(),
            artifact_prefix,
            build_subdir: merged.build_subdir,
            clone_mode: CloneMode {
                shallow: merged.shallow.unwrap_or(false),
                at_branch: merged.clone_at_branch.unwrap_or(false),
            },
            artifact_select: merged.artifact_select,
            install_name: merged.install_name,
            build_tool,
            patch_pom_versions: merged.patch_pom_versions.unwrap_or(false),
        })
    }
}

fn required(value: Option<String>, key: &str, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DepforgeError::ConfigError {
            message: format!("dependency '{key}' is missing '{field}'"),
        }
        .into()),
    }
}

/// A dependency with its preset applied and required fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// Table key; names the lock file
    pub key: String,
    /// Display name
    pub name: String,
    /// Source URL
    pub url: String,
    /// Configured version, possibly `latest`
    pub version: String,
    /// Vendor or bin
    pub destination: DestinationKind,
    /// Prefix of installed file names
    pub artifact_prefix: String,
    /// Build subdirectory
    pub build_subdir: Option<PathBuf>,
    /// Clone strategy
    pub clone_mode: CloneMode,
    /// Artifact name suffix filter
    pub artifact_select: Option<String>,
    /// Fixed installed file name
    pub install_name: Option<String>,
    /// Build tool
    pub build_tool: BuildTool,
    /// Patch snapshot versions in poms before building
    pub patch_pom_versions: bool,
}

impl ResolvedDependency {
    /// Whether the version must be looked up as the latest release first.
    #[must_use]
    pub fn wants_latest(&self) -> bool {
        self.version == LATEST_VERSION
    }

    /// Same dependency pinned to `version`.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Parsed `depforge.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Vendor library destination
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: PathBuf,
    /// Tool destination
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
    /// Dependencies by key
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyConfig>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    root: PathBuf,
}

fn default_vendor_dir() -> PathBuf {
    PathBuf::from(DEFAULT_VENDOR_DIR)
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BIN_DIR)
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            vendor_dir: default_vendor_dir(),
            bin_dir: default_bin_dir(),
            dependencies: BTreeMap::new(),
            root: PathBuf::from("."),
        }
    }
}

impl ProjectConfig {
    /// Loads the file at `explicit`, or `depforge.toml` in the current directory.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf);
        if !path.is_file() {
            return Err(DepforgeError::ConfigError {
                message: format!("no configuration file found at {}", path.display()),
            }
            .into());
        }
        Self::load(&path)
    }

    /// Loads and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.anchored(path, root)
    }

    /// Parses `content` (read from `path`) with relative paths anchored at `root`.
    pub fn parse(content: &str, path: &Path, root: impl Into<PathBuf>) -> Result<Self> {
        let config: Self = parse_config_str(content, path)?;
        config.anchored(path, root.into())
    }

    fn anchored(mut self, path: &Path, root: PathBuf) -> Result<Self> {
        self.root = root;
        self.validate()?;
        tracing::debug!("Loaded {} with {} dependencies", path.display(), self.dependencies.len());
        Ok(self)
    }

    /// Resolves every dependency, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        for (key, dep) in &self.dependencies {
            dep.resolve(key)?;
        }
        Ok(())
    }

    /// Absolute-or-root-relative destination directory for `kind`.
    #[must_use]
    pub fn destination_root(&self, kind: DestinationKind) -> PathBuf {
        match kind {
            DestinationKind::Vendor => self.root.join(&self.vendor_dir),
            DestinationKind::Bin => self.root.join(&self.bin_dir),
        }
    }

    /// Resolves the dependencies named in `names`, or all of them when empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<ResolvedDependency>> {
        if names.is_empty() {
            return self.dependencies.iter().map(|(key, dep)| dep.resolve(key)).collect();
        }
        names
            .iter()
            .map(|name| match self.dependencies.get(name) {
                Some(dep) => dep.resolve(name),
                None => Err(DepforgeError::UnknownDependency {
                    name: name.clone(),
                }
                .into()),
            })
            .collect()
    }

    /// Builds the installer description for a resolved dependency.
    #[must_use]
    pub fn spec(&self, dep: &ResolvedDependency) -> DependencySpec {
        let mut spec = DependencySpec::new(
            &dep.name,
            &dep.url,
            &dep.version,
            self.destination_root(dep.destination),
        )
        .key(&dep.key)
        .destination_kind(dep.destination)
        .artifact_filter(ArtifactFilter::Prefix(dep.artifact_prefix.clone()))
        .clone_mode(dep.clone_mode)
        .build_tool(dep.build_tool.clone())
        .pom_version_patch(dep.patch_pom_versions);

        if let Some(subdir) = &dep.build_subdir {
            spec = spec.build_subdir(subdir);
        }
        if let Some(select) = &dep.artifact_select {
            spec = spec.artifact_select(ArtifactFilter::Suffix(select.clone()));
        }
        if let Some(install_name) = &dep.install_name {
            spec = spec.install_name(install_name);
        }
        spec
    }
}
