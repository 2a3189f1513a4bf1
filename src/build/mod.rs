//! Build-tool client: runs a dependency's own build and finds what it produced.
//!
//! The default tool is Maven (`mvn clean install --quiet`), whose packaged
//! outputs are `.jar` files inside `target/` directories. Multi-module
//! projects produce one `target/` per module, so artifact discovery walks the
//! whole tree rather than looking at the top level only.

mod pom;

pub use pom::{find_poms, patch_pom_versions};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::{ARTIFACT_SUFFIX, BUILD_OUTPUT_DIR, MAVEN_ARGS, MAVEN_COMMAND};
use crate::core::DepforgeError;
use crate::exec::ExecCommand;

/// A file produced by a build, waiting to be moved into a destination root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildArtifact {
    path: PathBuf,
}

impl BuildArtifact {
    /// Wraps a discovered artifact path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Full path of the artifact.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the artifact as UTF-8, lossily converted.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

/// A build command plus the conventions used to find its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTool {
    program: String,
    args: Vec<String>,
    output_dir_name: String,
    artifact_suffix: String,
}

impl Default for BuildTool {
    fn default() -> Self {
        Self::maven()
    }
}

impl BuildTool {
    /// `mvn clean install --quiet`, collecting `.jar` files from `target/`.
    #[must_use]
    pub fn maven() -> Self {
        Self::new(MAVEN_COMMAND).args(MAVEN_ARGS)
    }

    /// A build tool running `program` with no arguments and Maven's output
    /// conventions.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output_dir_name: BUILD_OUTPUT_DIR.to_string(),
            artifact_suffix: ARTIFACT_SUFFIX.to_string(),
        }
    }

    /// Builds a tool from an argv list (`["mvn", "clean", "install"]`).
    ///
    /// # Errors
    ///
    /// Returns [`DepforgeError::ConfigError`] for an empty list.
    pub fn from_command_line<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().ok_or_else(|| DepforgeError::ConfigError {
            message: "build-command must name a program".to_string(),
        })?;
        Ok(Self::new(program).args(argv))
    }

    /// Appends build arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Name of the directories that hold build outputs.
    #[must_use]
    pub fn output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.output_dir_name = name.into();
        self
    }

    /// File name suffix that marks a packaged artifact.
    #[must_use]
    pub fn artifact_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.artifact_suffix = suffix.into();
        self
    }

    /// The build executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the build in `work_dir`.
    ///
    /// A non-zero exit fails with [`DepforgeError::NonZeroExit`] carrying the
    /// build's captured stderr.
    pub async fn build(&self, work_dir: &Path) -> Result<()> {
        tracing::debug!(target: "build", "Building in {}", work_dir.display());

        ExecCommand::new(&self.program)
            .args(self.args.iter().cloned())
            .current_dir(work_dir)
            .with_context(format!("Building {}", work_dir.display()))
            .execute()
            .await
            .with_context(|| format!("Build failed in {}", work_dir.display()))?;
        Ok(())
    }

    /// Lazily finds every artifact under `work_dir`.
    ///
    /// Yields each file whose name ends with the artifact suffix and whose
    /// parent directory is named like the output directory, at any depth.
    /// Order is unspecified. Traversal errors are yielded as `Err` items.
    pub fn find_artifacts(
        &self,
        work_dir: &Path,
    ) -> impl Iterator<Item = Result<BuildArtifact>> + use<> {
        let output_dir_name = self.output_dir_name.clone();
        let suffix = self.artifact_suffix.clone();

        WalkDir::new(work_dir).min_depth(1).into_iter().filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(anyhow::Error::new(e)
                        .context(format!("Failed to scan {} for artifacts", path.display()))));
                }
            };

            if !entry.file_type().is_file() {
                return None;
            }
            let in_output_dir = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .is_some_and(|parent| parent == output_dir_name.as_str());
            let matches_suffix = entry.file_name().to_string_lossy().ends_with(suffix.as_str());

            (in_output_dir && matches_suffix).then(|| Ok(BuildArtifact::new(entry.into_path())))
        })
    }
}
