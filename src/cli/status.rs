//! `depforge status`: show configured and installed versions.
//!
//! Reads lock files only. Nothing is cloned, built, or looked up over the
//! network, so a dependency configured as `latest` is reported against the
//! literal string `latest`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::ProjectConfig;
use crate::installer::DependencyInstaller;

/// Arguments for `depforge status`.
#[derive(Args, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    /// Prints one line per configured dependency.
    pub async fn execute(self, config: &ProjectConfig) -> Result<()> {
        let deps = config.select(&[])?;
        if deps.is_empty() {
            println!("No dependencies configured.");
            return Ok(());
        }

        for dep in deps {
            let installer = DependencyInstaller::new(config.spec(&dep));
            let status = installer.status().await?;
            let state = if status.needs_install() {
                status.describe().yellow()
            } else {
                status.describe().green()
            };
            println!(
                "{:<20} {:<12} installed: {:<12} {} [{}]",
                dep.key,
                status.configured,
                status.installed.as_deref().unwrap_or("-"),
                state,
                installer.spec().destination().display()
            );
        }
        Ok(())
    }
}
