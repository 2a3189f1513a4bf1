//! Command-line interface for depforge.
//!
//! # Commands
//!
//! - `install [NAMES...]` - bring dependencies up to their configured versions
//! - `uninstall [NAMES...]` - remove installed artifacts and lock files
//! - `status` - show configured and installed versions
//! - `check-env` - verify that git and the build tools are on `PATH`
//!
//! Without names, `install` and `uninstall` act on every configured
//! dependency, one after another in key order. The first failure stops the
//! run.
//!
//! # Global Options
//!
//! - `-v, --verbose` - debug logging (full command lines and state transitions)
//! - `-q, --quiet` - warnings and errors only
//! - `-c, --config <PATH>` - configuration file (also `DEPFORGE_CONFIG`)
//!
//! `RUST_LOG` overrides the level chosen by `--verbose`/`--quiet`.

mod check_env;
mod install;
mod status;
mod uninstall;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::ProjectConfig;
use crate::constants::{CONFIG_ENV_VAR, CONFIG_FILE_NAME};

pub use check_env::CheckEnvCommand;
pub use install::InstallCommand;
pub use status::StatusCommand;
pub use uninstall::UninstallCommand;

/// Top-level argument parser.
#[derive(Parser, Debug)]
#[command(
    name = "depforge",
    about = "Fetch, build, and vendor external source dependencies",
    version,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output, including every command line executed
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file [default: ./depforge.toml]
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install dependencies whose lock file is missing or out of date
    Install(InstallCommand),
    /// Remove installed artifacts and lock files
    Uninstall(UninstallCommand),
    /// Show configured and installed versions
    Status(StatusCommand),
    /// Check that git and the configured build tools are available
    CheckEnv(CheckEnvCommand),
}

impl Cli {
    /// Log level implied by `--verbose` / `--quiet`.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Runs the selected command.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.log_level());

        let explicit = self.config.as_deref();
        match self.command {
            Commands::Install(cmd) => cmd.execute(&ProjectConfig::discover(explicit)?).await,
            Commands::Uninstall(cmd) => cmd.execute(&ProjectConfig::discover(explicit)?).await,
            Commands::Status(cmd) => cmd.execute(&ProjectConfig::discover(explicit)?).await,
            Commands::CheckEnv(cmd) => {
                // Works without a configuration file: only git is checked then.
                let config = match &self.config {
                    Some(path) => ProjectConfig::load(path)?,
                    None if Path::new(CONFIG_FILE_NAME).is_file() => {
                        ProjectConfig::load(Path::new(CONFIG_FILE_NAME))?
                    }
                    None => ProjectConfig::default(),
                };
                cmd.execute(&config)
            }
        }
    }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_level`. Calling this more than once is harmless.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
