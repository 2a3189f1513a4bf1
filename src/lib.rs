//! depforge - fetch, build, and vendor external source dependencies
//!
//! depforge clones a dependency's source repository, runs the dependency's own
//! build, and moves the produced artifacts into the host project: library jars
//! into a vendor directory, tool archives into a bin directory. A per-dependency
//! lock file records the version last installed, so repeated runs do nothing
//! until the configured version changes.
//!
//! # Architecture Overview
//!
//! ```text
//! installer ──▶ git ──┐
//!     │               ├──▶ exec ──▶ exec::redirect
//!     └──────▶ build ─┘
//! ```
//!
//! - [`exec`] - runs external commands; drains stdout/stderr into pluggable
//!   sinks on two tasks per command and folds drain errors and the exit status
//!   into one result
//! - [`git`] - `git clone` / `git checkout` with the default-branch skip rule
//! - [`build`] - runs the build command and discovers artifacts in `target/`
//!   directories at any depth
//! - [`installer`] - the `CheckLock → Download → Clean → Install → WriteLock`
//!   state machine, plus uninstall and status
//! - [`lockfile`] - the plain-text `<key>.lock` record
//!
//! ## Supporting Modules
//!
//! - [`cli`] - the `depforge` command line
//! - [`config`] - `depforge.toml` loading and built-in presets
//! - [`core`] - error types and user-facing error rendering
//! - [`release`] - `latest` version lookup through GitHub release redirects
//! - [`utils`] - async file system helpers and tool lookup
//!
//! # Configuration (depforge.toml)
//!
//! ```toml
//! vendor-dir = "vendor"
//! bin-dir = ".bin"
//!
//! [dependencies.fgputil]
//! preset = "fgputil"
//! version = "v1.2.3"
//!
//! [dependencies.raml4jaxrs]
//! preset = "raml-for-jaxrs"
//! version = "3.0.7"
//! ```
//!
//! # Library Use
//!
//! ```rust,no_run
//! use depforge::installer::{DependencyInstaller, DependencySpec, InstallOutcome};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let spec = DependencySpec::new(
//!     "fgputil",
//!     "https://github.com/VEuPathDB/FgpUtil.git",
//!     "v1.2.3",
//!     "vendor",
//! );
//! match DependencyInstaller::new(spec).install().await? {
//!     InstallOutcome::UpToDate { .. } => println!("nothing to do"),
//!     InstallOutcome::Installed { artifacts, .. } => println!("{} jars", artifacts.len()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//!
//! - No timeouts: a hung `git` or build process blocks forever.
//! - No locking: two installers must not share a destination directory.
//! - No rollback: a failed install may leave the destination cleaned but not
//!   repopulated. The lock file keeps its old value so the next run retries.

pub mod build;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod exec;
pub mod git;
pub mod installer;
pub mod lockfile;
pub mod release;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
