//! Core types and error handling for depforge.
//!
//! Everything that fails in this crate ends up as a [`DepforgeError`] somewhere
//! in an [`anyhow::Error`] chain. [`user_friendly_error`] turns such a chain
//! into an [`ErrorContext`] with suggestions for the terminal.

pub mod error;

pub use error::{DepforgeError, ErrorContext, user_friendly_error};
