//! `depforge check-env`: verify required tools are on `PATH`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::BTreeSet;

use crate::config::ProjectConfig;
use crate::core::DepforgeError;
use crate::git::Git;
use crate::utils::platform::resolve_command;

/// Arguments for `depforge check-env`.
#[derive(Args, Debug)]
pub struct CheckEnvCommand {}

impl CheckEnvCommand {
    /// Checks git plus every distinct configured build program.
    ///
    /// Fails on the first missing tool after printing the full report.
    pub fn execute(self, config: &ProjectConfig) -> Result<()> {
        let git = Git::new();
        let mut programs = BTreeSet::new();
        for dep in config.select(&[])? {
            programs.insert(dep.build_tool.program().to_string());
        }

        let mut missing = Vec::new();
        for program in std::iter::once(git.program().to_string()).chain(programs) {
            match resolve_command(&program) {
                Some(path) => println!("{} {} ({})", "✓".green(), program, path.display()),
                None => {
                    println!("{} {} not found", "✗".red(), program);
                    missing.push(program);
                }
            }
        }

        match missing.first() {
            None => Ok(()),
            Some(program) if program == git.program() => git.ensure_available(),
            Some(program) => Err(DepforgeError::ToolNotFound {
                program: program.clone(),
            }
            .into()),
        }
    }
}
