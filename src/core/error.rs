//! Error handling for depforge
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`DepforgeError`]) at the point of failure, so
//!    callers and tests can tell a missing binary from a failing build.
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    when an error finally reaches the terminal.
//!
//! Inside the crate errors travel as [`anyhow::Error`]; each layer attaches its
//! own context (`Failed to clone ...`, `Failed to install FgpUtil`) while the
//! typed root cause stays downcastable through [`anyhow::Error::chain`].
//!
//! # Error Categories
//!
//! - **Process execution**: [`DepforgeError::ProcessSpawn`],
//!   [`DepforgeError::NonZeroExit`], [`DepforgeError::StreamIo`]
//! - **File system**: [`DepforgeError::FileSystem`], [`DepforgeError::NotADirectory`]
//! - **Environment**: [`DepforgeError::GitNotFound`], [`DepforgeError::ToolNotFound`]
//! - **Configuration**: [`DepforgeError::ConfigError`], [`DepforgeError::ConfigParse`],
//!   [`DepforgeError::UnknownDependency`]
//! - **Network**: [`DepforgeError::ReleaseLookup`]
//!
//! Every error is fatal at first detection. Nothing here distinguishes a
//! transient failure (a network hiccup during clone) from a permanent one.
//!
//! # Examples
//!
//! ```rust,no_run
//! use depforge::core::{DepforgeError, user_friendly_error};
//!
//! let err = anyhow::Error::from(DepforgeError::GitNotFound);
//! user_friendly_error(err).display();
//! ```

use colored::Colorize;
use std::fmt;
use std::io;
use thiserror::Error;

/// Enumerated failure cases for depforge.
#[derive(Error, Debug)]
pub enum DepforgeError {
    /// The command binary could not be started (missing, not executable).
    #[error("Failed to start command `{program}`")]
    ProcessSpawn {
        /// Program that was being spawned
        program: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// An external command exited with a non-zero status.
    ///
    /// `stderr` holds the full captured error output when stderr was collected
    /// into the default in-memory buffer, and is `None` when the caller routed
    /// stderr to its own sink.
    #[error("Command `{command}` failed with exit code {code}{}", render_stderr(.stderr))]
    NonZeroExit {
        /// Rendered command line
        command: String,
        /// Exit code (`-1` when terminated by a signal)
        code: i32,
        /// Captured stderr, if it was captured
        stderr: Option<String>,
    },

    /// Draining a child process output stream failed.
    #[error("Failed to redirect {stream} of command `{command}`")]
    StreamIo {
        /// `"stdout"` or `"stderr"`
        stream: String,
        /// Rendered command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A file system operation failed.
    #[error("File system error: failed to {operation} {path}")]
    FileSystem {
        /// What was being attempted ("create directory", "delete file", ...)
        operation: String,
        /// Path involved
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A path that must be a directory exists as something else.
    #[error("Path {path} exists but is not a directory")]
    NotADirectory {
        /// Offending path
        path: String,
    },

    /// The `git` executable is not on `PATH`.
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// A required tool is not on `PATH`.
    #[error("Required tool `{program}` is not installed or not found in PATH")]
    ToolNotFound {
        /// Program name
        program: String,
    },

    /// Configuration is semantically invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Configuration file could not be parsed.
    #[error("Invalid configuration file {file}: {reason}")]
    ConfigParse {
        /// Configuration file path
        file: String,
        /// Parser message
        reason: String,
    },

    /// A dependency name given on the command line is not configured.
    #[error("Dependency '{name}' is not configured")]
    UnknownDependency {
        /// Requested dependency name
        name: String,
    },

    /// Resolving the latest release tag failed.
    #[error("Failed to resolve latest release from {url}: {reason}")]
    ReleaseLookup {
        /// Release URL queried
        url: String,
        /// What went wrong
        reason: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

fn render_stderr(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) => format!(": {text}"),
        None => ". stderr was redirected to a custom sink".to_string(),
    }
}

fn clone_io(e: &io::Error) -> io::Error {
    io::Error::new(e.kind(), e.to_string())
}

impl Clone for DepforgeError {
    fn clone(&self) -> Self {
        match self {
            Self::ProcessSpawn {
                program,
                source,
            } => Self::ProcessSpawn {
                program: program.clone(),
                source: clone_io(source),
            },
            Self::NonZeroExit {
                command,
                code,
                stderr,
            } => Self::NonZeroExit {
                command: command.clone(),
                code: *code,
                stderr: stderr.clone(),
            },
            Self::StreamIo {
                stream,
                command,
                source,
            } => Self::StreamIo {
                stream: stream.clone(),
                command: command.clone(),
                source: clone_io(source),
            },
            Self::FileSystem {
                operation,
                path,
                source,
            } => Self::FileSystem {
                operation: operation.clone(),
                path: path.clone(),
                source: clone_io(source),
            },
            Self::NotADirectory {
                path,
            } => Self::NotADirectory {
                path: path.clone(),
            },
            Self::GitNotFound => Self::GitNotFound,
            Self::ToolNotFound {
                program,
            } => Self::ToolNotFound {
                program: program.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::ConfigParse {
                file,
                reason,
            } => Self::ConfigParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::UnknownDependency {
                name,
            } => Self::UnknownDependency {
                name: name.clone(),
            },
            Self::ReleaseLookup {
                url,
                reason,
            } => Self::ReleaseLookup {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

impl DepforgeError {
    /// Builds a [`DepforgeError::FileSystem`] for `path`.
    pub fn fs(operation: impl Into<String>, path: &std::path::Path, source: io::Error) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.display().to_string(),
            source,
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// Displayed as:
/// 1. **error**: the main message in red
/// 2. **details**: surrounding context in yellow (optional)
/// 3. **suggestion**: what to try next in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DepforgeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DepforgeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with suggestions.
///
/// The first [`DepforgeError`] found in the chain decides the suggestion. The
/// context messages layered above it (e.g. "Failed to install FgpUtil") are
/// kept as details so the user can see which step failed, followed by the
/// underlying OS error when there is one.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let outer: Vec<String> = error
        .chain()
        .take_while(|cause| cause.downcast_ref::<DepforgeError>().is_none())
        .map(ToString::to_string)
        .collect();

    if let Some(typed) = error.chain().find_map(|cause| cause.downcast_ref::<DepforgeError>()) {
        let mut ctx = create_error_context(typed.clone());
        if !outer.is_empty() {
            // The typed error's own details carry the OS cause; keep both.
            let steps = outer.join(": ");
            ctx.details = Some(match ctx.details.take() {
                Some(cause) => format!("{steps}\ncaused by: {cause}"),
                None => steps,
            });
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<io::Error>() {
        if io_error.kind() == io::ErrorKind::PermissionDenied {
            return ErrorContext::new(DepforgeError::Other {
                message: error.to_string(),
            })
            .with_suggestion(
                "Check file ownership and permissions of the vendor and bin directories",
            );
        }
    }

    // Generic error - include the full chain for diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DepforgeError::Other {
        message,
    })
}

fn create_error_context(error: DepforgeError) -> ErrorContext {
    match &error {
        DepforgeError::ProcessSpawn {
            program,
            source,
        } => {
            let suggestion = if source.kind() == io::ErrorKind::NotFound {
                format!("Install `{program}` and make sure it is on your PATH")
            } else {
                format!("Check that `{program}` is executable by the current user")
            };
            ErrorContext::new(error.clone())
                .with_suggestion(suggestion)
                .with_details(source.to_string())
        }
        DepforgeError::NonZeroExit {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Re-run with --verbose to see the full command line and working directory",
        ),
        DepforgeError::StreamIo {
            source,
            ..
        } => {
            let details = source.to_string();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check that the redirect target is writable and the disk is not full")
        }
        DepforgeError::FileSystem {
            source,
            ..
        } => {
            let details = source.to_string();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check directory permissions and available disk space")
        }
        DepforgeError::NotADirectory {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Remove the file or point vendor-dir/bin-dir somewhere else"),
        DepforgeError::GitNotFound => ErrorContext::new(error).with_suggestion(
            "Install git from https://git-scm.com/ or your package manager (brew install git, apt install git)",
        ),
        DepforgeError::ToolNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Install the tool or set build-command in depforge.toml"),
        DepforgeError::ConfigError {
            ..
        }
        | DepforgeError::ConfigParse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check depforge.toml: every dependency needs a version and a url or preset"),
        DepforgeError::UnknownDependency {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run `depforge status` to list configured dependencies"),
        DepforgeError::ReleaseLookup {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check your network connection or pin an explicit version instead of \"latest\""),
        DepforgeError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
