//! depforge CLI entry point
//!
//! Parses arguments, runs the selected command, and renders any failure with
//! suggestions before exiting with status 1.

use anyhow::Result;
use clap::Parser;
use depforge::cli;
use depforge::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
