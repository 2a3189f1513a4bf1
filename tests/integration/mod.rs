//! Integration test suite for depforge
//!
//! End-to-end tests that run the installer against real local git
//! repositories and a shell-script build. They need `git` and `sh` on `PATH`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=installer=debug cargo test --test integration -- --nocapture
//! ```
//!
//! # Test Organization
//!
//! - **install_pipeline**: lock-driven install, update, failure and uninstall
//! - **clone_strategy**: git invocations per clone mode and target
//! - **artifacts**: artifact discovery, selection, renaming and build subdirectories
//! - **pom_patching**: snapshot version rewriting before a build
//! - **exec_streams**: process output draining and failure reporting
//! - **cli**: the `depforge` binary

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

#[cfg(unix)]
mod artifacts;
#[cfg(unix)]
mod exec_streams;
#[cfg(unix)]
mod install_pipeline;
