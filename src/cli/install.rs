//! `depforge install`: bring dependencies up to their configured versions.
//!
//! ```bash
//! depforge install              # every configured dependency
//! depforge install fgputil      # just one
//! ```
//!
//! A dependency configured as `version = "latest"` has its newest GitHub
//! release tag looked up first; the tag is what gets cloned and recorded.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::ProjectConfig;
use crate::installer::{DependencyInstaller, InstallOutcome};
use crate::release::latest_release_tag;

/// Arguments for `depforge install`.
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Dependencies to install (all when omitted)
    #[arg(value_name = "NAMES")]
    pub names: Vec<String>,
}

impl InstallCommand {
    /// Installs the selected dependencies one at a time.
    pub async fn execute(self, config: &ProjectConfig) -> Result<()> {
        let deps = config.select(&self.names)?;
        if deps.is_empty() {
            println!("No dependencies configured.");
            return Ok(());
        }

        let mut installed = 0usize;
        for dep in deps {
            let dep = if dep.wants_latest() {
                let tag = latest_release_tag(&dep.url)
                    .await
                    .with_context(|| format!("Failed to resolve latest version of {}", dep.name))?;
                dep.with_version(tag)
            } else {
                dep
            };

            let installer = DependencyInstaller::new(config.spec(&dep));
            match installer.install().await? {
                InstallOutcome::UpToDate {
                    version,
                } => {
                    println!("{} {} {} (up to date)", "✓".green(), dep.name, version);
                }
                InstallOutcome::Installed {
                    version,
                    previous,
                    artifacts,
                } => {
                    installed += 1;
                    let change = match previous {
                        Some(previous) => format!("{previous} -> {version}"),
                        None => version,
                    };
                    println!(
                        "{} {} {} ({} artifact{})",
                        "✓".green(),
                        dep.name.bold(),
                        change,
                        artifacts.len(),
                        if artifacts.len() == 1 { "" } else { "s" }
                    );
                }
            }
        }

        if installed > 0 {
            println!("\n{}", format!("Installed {installed} dependencies").green().bold());
        }
        Ok(())
    }
}
