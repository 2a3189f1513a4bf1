//! Global constants used throughout the depforge codebase.
//!
//! Command names, flags, and file-naming conventions shared by the
//! executor, the version-control and build-tool clients, and the installer.

/// Size of the chunk buffer used when draining a child process stream (8 KiB).
///
/// Every chunk is written and flushed to the sink before the next read.
pub const REDIRECT_BUFFER_SIZE: usize = 8192;

/// Branch names treated as a repository's default branch.
///
/// A checkout of either name is skipped after a fresh clone.
pub const DEFAULT_BRANCH_NAMES: [&str; 2] = ["main", "master"];

/// The git subcommand and flag vocabulary used by [`crate::git::Git`].
pub const GIT_CLONE: &str = "clone";
pub const GIT_CHECKOUT: &str = "checkout";
pub const GIT_FLAG_QUIET: &str = "--quiet";
pub const GIT_FLAG_DEPTH: &str = "--depth";
pub const GIT_FLAG_BRANCH: &str = "--branch";

/// Default build program and arguments (`mvn clean install --quiet`).
pub const MAVEN_COMMAND: &str = "mvn";
pub const MAVEN_ARGS: [&str; 3] = ["clean", "install", "--quiet"];

/// Conventional build output directory name searched by artifact discovery.
pub const BUILD_OUTPUT_DIR: &str = "target";

/// File name suffix of packaged build artifacts.
pub const ARTIFACT_SUFFIX: &str = ".jar";

/// Maven project file name.
pub const POM_FILE_NAME: &str = "pom.xml";

/// Source tree directory name not searched for poms.
pub const POM_SKIP_DIR: &str = "src";

/// Unreleased Maven version, as rewritten by pom version patching.
pub const SNAPSHOT_VERSION_PATTERN: &str = r"\d+\.\d+\.\d+-SNAPSHOT";

/// Extension appended to a dependency key to form its lock file name.
pub const LOCK_FILE_EXTENSION: &str = "lock";

/// Version string that triggers a "latest release" lookup.
pub const LATEST_VERSION: &str = "latest";

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "depforge.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "DEPFORGE_CONFIG";

/// Default vendor directory, relative to the project root.
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Default bin directory, relative to the project root.
pub const DEFAULT_BIN_DIR: &str = ".bin";
