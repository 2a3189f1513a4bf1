//! Fluent builder for running external commands with redirected output.
//!
//! [`ExecCommand`] is the single entry point depforge uses to run anything
//! outside the process: `git`, the dependency's build tool, and whatever a
//! test wants to stub in their place. Every execution follows the same steps:
//!
//! 1. Spawn the program with the argument list, the environment overlay merged
//!    onto the inherited environment, and the working directory.
//! 2. Bind stdout (default [`StreamSink::Discard`]) and stderr (default: an
//!    in-memory [`CaptureBuffer`]) through two [`Redirect`] drain tasks.
//! 3. Wait for the child to exit, then wait for both drains.
//! 4. Fold drain errors and the exit status into one result. A non-zero exit
//!    carries the captured stderr when the default buffer was used.
//! 5. Run the optional post-execution hook on success.
//!
//! No timeout is applied: a hung child blocks the caller indefinitely.
//!
//! # Examples
//!
//! ```rust,no_run
//! use depforge::exec::{ExecCommand, StreamSink};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! ExecCommand::new("mvn")
//!     .args(["clean", "install", "--quiet"])
//!     .current_dir(Path::new("vendor/FgpUtil"))
//!     .stdout(StreamSink::file("build.log"))
//!     .with_context("Building FgpUtil")
//!     .execute()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod redirect;

use anyhow::{Context, Result, anyhow};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::process::Command;

use crate::core::DepforgeError;

pub use redirect::{CaptureBuffer, Redirect, StreamSink};

/// Callback run after a command exits successfully.
///
/// An error returned from the hook fails the whole execution.
pub type PostExecHook = Box<dyn FnOnce() -> Result<()> + Send>;

/// Outcome of a successful command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Process exit code (always `0` for a returned result)
    pub exit_code: i32,
    /// Captured stderr bytes; empty when stderr went to a custom sink
    pub stderr: Vec<u8>,
    /// Whether stderr was routed to a caller-supplied sink
    pub stderr_redirected: bool,
}

impl ExecutionResult {
    /// Captured stderr as text.
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Whether the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Builder for one external command invocation.
///
/// The builder is consumed by [`ExecCommand::execute`], so a built command
/// runs at most once.
pub struct ExecCommand {
    program: String,
    args: Vec<String>,
    env_vars: Vec<(OsString, OsString)>,
    current_dir: Option<PathBuf>,
    stdout: Option<StreamSink>,
    stderr: Option<StreamSink>,
    post_exec: Option<PostExecHook>,
    context: Option<String>,
}

impl std::fmt::Debug for ExecCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env_vars", &self.env_vars)
            .field("current_dir", &self.current_dir)
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .field("post_exec", &self.post_exec.is_some())
            .field("context", &self.context)
            .finish()
    }
}

impl ExecCommand {
    /// Creates a command for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env_vars: Vec::new(),
            current_dir: None,
            stdout: None,
            stderr: None,
            post_exec: None,
            context: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds one variable to the environment overlay.
    ///
    /// The overlay is merged onto the inherited environment; nothing is removed.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Adds several variables to the environment overlay.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.env_vars.extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the working directory of the child process.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Routes stdout to `sink` instead of discarding it.
    pub fn stdout(mut self, sink: StreamSink) -> Self {
        self.stdout = Some(sink);
        self
    }

    /// Routes stderr to `sink` instead of the internal capture buffer.
    ///
    /// A failing command then reports only its exit code.
    pub fn stderr(mut self, sink: StreamSink) -> Self {
        self.stderr = Some(sink);
        self
    }

    /// Registers a hook to run once the command has exited successfully.
    pub fn post_exec(mut self, hook: impl FnOnce() -> Result<()> + Send + 'static) -> Self {
        self.post_exec = Some(Box::new(hook));
        self
    }

    /// Labels log lines and errors for this command.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list.
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Human-readable command line (`program arg1 arg2 ...`).
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the command to completion.
    ///
    /// # Errors
    ///
    /// - [`DepforgeError::ProcessSpawn`] if the program cannot be started
    /// - [`DepforgeError::StreamIo`] if draining stdout or stderr failed
    /// - [`DepforgeError::NonZeroExit`] if the program exited with a non-zero status
    /// - whatever the post-execution hook returns
    pub async fn execute(self) -> Result<ExecutionResult> {
        let start = Instant::now();
        let command_line = self.command_line();
        let Self {
            program,
            args,
            env_vars,
            current_dir,
            stdout,
            stderr,
            post_exec,
            context,
        } = self;

        let working_dir = current_dir
            .as_ref()
            .map_or_else(|| "<current directory>".to_string(), |d| d.display().to_string());
        match &context {
            Some(ctx) => {
                tracing::info!(target: "exec", "({}) Executing command `{}`", ctx, command_line);
            }
            None => tracing::info!(target: "exec", "Executing command `{}`", command_line),
        }
        tracing::debug!(
            target: "exec",
            "\n  Executing:\n    {}\n  In directory:\n    {}",
            command_line,
            working_dir
        );

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &env_vars {
            tracing::trace!(target: "exec", "Setting env var: {:?}={:?}", key, value);
            cmd.env(key, value);
        }
        if let Some(dir) = &current_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| DepforgeError::ProcessSpawn {
            program: program.clone(),
            source,
        })?;

        let child_stdout =
            child.stdout.take().ok_or_else(|| anyhow!("stdout of `{command_line}` was not piped"))?;
        let child_stderr =
            child.stderr.take().ok_or_else(|| anyhow!("stderr of `{command_line}` was not piped"))?;

        let (stderr_sink, captured) = match stderr {
            Some(sink) => (sink, None),
            None => {
                let buffer = CaptureBuffer::new();
                (StreamSink::Buffer(buffer.clone()), Some(buffer))
            }
        };

        let stdout_redirect =
            Redirect::start("stdout", child_stdout, stdout.unwrap_or(StreamSink::Discard));
        let stderr_redirect = Redirect::start("stderr", child_stderr, stderr_sink);

        // Exit alone does not mean the sinks are complete; both drains must finish.
        let status = child.wait().await;
        let (stdout_done, stderr_done) =
            tokio::join!(stdout_redirect.wait(), stderr_redirect.wait());
        let status = status.with_context(|| format!("Failed to wait for `{command_line}`"))?;
        let exit_code = exit_code(status);

        for (stream, done) in [("stdout", stdout_done), ("stderr", stderr_done)] {
            if let Err(source) = done {
                let err = anyhow::Error::from(DepforgeError::StreamIo {
                    stream: stream.to_string(),
                    command: command_line.clone(),
                    source,
                });
                return Err(if exit_code == 0 {
                    err
                } else {
                    err.context(format!("`{command_line}` also exited with code {exit_code}"))
                });
            }
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "exec::perf",
                "`{}` took {:.2}s",
                command_line,
                elapsed.as_secs_f64()
            );
        } else {
            tracing::debug!(target: "exec::perf", "`{}` took {}ms", command_line, elapsed.as_millis());
        }

        let stderr_bytes = captured.as_ref().map(CaptureBuffer::contents).unwrap_or_default();

        if exit_code != 0 {
            tracing::debug!(
                target: "exec",
                "Command failed with exit code {}: {}",
                exit_code,
                command_line
            );
            return Err(DepforgeError::NonZeroExit {
                command: command_line,
                code: exit_code,
                stderr: captured.map(|_| String::from_utf8_lossy(&stderr_bytes).into_owned()),
            }
            .into());
        }

        if !stderr_bytes.is_empty() {
            tracing::debug!(
                target: "exec",
                "{}",
                String::from_utf8_lossy(&stderr_bytes).trim_end()
            );
        }

        if let Some(hook) = post_exec {
            hook().with_context(|| {
                format!("Post-execution hook failed after `{command_line}`")
            })?;
        }

        Ok(ExecutionResult {
            exit_code,
            stderr: stderr_bytes,
            stderr_redirected: captured.is_none(),
        })
    }
}

/// Exit code of a finished child; `-1` when it was terminated by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => {
            tracing::warn!(target: "exec", "Process terminated without an exit code: {}", status);
            -1
        }
    }
}
