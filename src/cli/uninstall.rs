//! `depforge uninstall`: remove installed artifacts and lock files.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::ProjectConfig;
use crate::installer::DependencyInstaller;

/// Arguments for `depforge uninstall`.
#[derive(Args, Debug)]
pub struct UninstallCommand {
    /// Dependencies to remove (all when omitted)
    #[arg(value_name = "NAMES")]
    pub names: Vec<String>,
}

impl UninstallCommand {
    /// Runs the uninstall sweep for each selected dependency.
    pub async fn execute(self, config: &ProjectConfig) -> Result<()> {
        for dep in config.select(&self.names)? {
            let removed = DependencyInstaller::new(config.spec(&dep)).uninstall().await?;
            if removed.is_empty() {
                println!("{} {} (nothing installed)", "-".dimmed(), dep.name);
            } else {
                println!("{} {} ({} removed)", "✓".green(), dep.name, removed.len());
            }
        }
        Ok(())
    }
}
