//! Stream redirection for child process output.
//!
//! A [`Redirect`] drains one output stream of a child process (stdout or
//! stderr) into a [`StreamSink`] on its own tokio task. Starting a redirect
//! returns immediately; the data written to the sink is only complete once
//! [`Redirect::wait`] has returned. Observing the child's exit is not enough.
//!
//! The source is always read to EOF, whatever happens to the sink. A child
//! writing into a pipe nobody reads blocks once the OS pipe buffer fills, so
//! even [`StreamSink::Discard`], a sink that fails to open, or a sink that
//! fails mid-copy keeps consuming bytes until the child closes the stream.
//!
//! # Examples
//!
//! ```rust,no_run
//! use depforge::exec::redirect::{CaptureBuffer, Redirect, StreamSink};
//!
//! # async fn example() -> std::io::Result<()> {
//! let buffer = CaptureBuffer::new();
//! let source: &'static [u8] = b"hello";
//! let redirect = Redirect::start("stdout", source, StreamSink::Buffer(buffer.clone()));
//! redirect.wait().await?;
//! assert_eq!(buffer.to_string_lossy(), "hello");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

use crate::constants::REDIRECT_BUFFER_SIZE;

/// Boxed async writer a sink resolves to once opened.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared, cloneable in-memory byte buffer.
///
/// Clones share the same storage, so a caller can keep one handle while the
/// redirect task writes through another.
#[derive(Clone, Debug, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the captured bytes.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the captured bytes decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Number of bytes captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AsyncWrite for CaptureBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.inner.lock() {
            Ok(mut guard) => {
                guard.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            Err(_) => Poll::Ready(Err(io::Error::other("capture buffer lock poisoned"))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Destination for one redirected output stream.
///
/// Exactly one sink is bound per stream per command execution.
pub enum StreamSink {
    /// Read and drop everything.
    Discard,
    /// Write to a file, creating it if absent and truncating it otherwise.
    File(PathBuf),
    /// Append to a shared in-memory buffer.
    Buffer(CaptureBuffer),
    /// Write to a caller-supplied writer. The writer is shut down at EOF.
    Writer(BoxedWriter),
    /// Forward to this process's stdout.
    Stdout,
    /// Forward to this process's stderr.
    Stderr,
}

impl StreamSink {
    /// File sink for `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Caller-supplied writer sink.
    pub fn writer(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self::Writer(Box::new(writer))
    }

    /// Opens the underlying destination.
    async fn open(self) -> io::Result<BoxedWriter> {
        Ok(match self {
            Self::Discard => Box::new(tokio::io::sink()),
            Self::File(path) => Box::new(
                OpenOptions::new().create(true).write(true).truncate(true).open(&path).await?,
            ),
            Self::Buffer(buffer) => Box::new(buffer),
            Self::Writer(writer) => writer,
            Self::Stdout => Box::new(tokio::io::stdout()),
            Self::Stderr => Box::new(tokio::io::stderr()),
        })
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discard => f.write_str("Discard"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Buffer(buffer) => f.debug_tuple("Buffer").field(&buffer.len()).finish(),
            Self::Writer(_) => f.write_str("Writer(..)"),
            Self::Stdout => f.write_str("Stdout"),
            Self::Stderr => f.write_str("Stderr"),
        }
    }
}

/// A running drain of one stream into one sink.
#[derive(Debug)]
pub struct Redirect {
    stream: &'static str,
    handle: JoinHandle<io::Result<u64>>,
}

impl Redirect {
    /// Spawns a task that drains `source` into `sink` and returns immediately.
    pub fn start<R>(stream: &'static str, source: R, sink: StreamSink) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tracing::trace!(target: "exec", "Redirecting {} to {:?}", stream, sink);

        let handle = tokio::spawn(async move {
            let mut source = source;
            match sink.open().await {
                Ok(mut dest) => pipe(&mut source, &mut dest).await,
                Err(e) => {
                    drain(&mut source).await;
                    Err(e)
                }
            }
        });

        Self {
            stream,
            handle,
        }
    }

    /// Name of the redirected stream (`"stdout"` or `"stderr"`).
    #[must_use]
    pub const fn stream(&self) -> &'static str {
        self.stream
    }

    /// Waits until the source is exhausted and the destination closed.
    ///
    /// Returns the number of bytes delivered to the sink.
    pub async fn wait(self) -> io::Result<u64> {
        match self.handle.await {
            Ok(result) => result,
            Err(join_error) => Err(io::Error::other(format!(
                "{} redirect task did not complete: {join_error}",
                self.stream
            ))),
        }
    }
}

/// Copies `source` into `dest` chunk by chunk, flushing after each chunk,
/// then shuts `dest` down.
///
/// A write failure stops delivery but the rest of `source` is still drained
/// before the error is returned.
pub async fn pipe<R, W>(source: &mut R, dest: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; REDIRECT_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let read = source.read(&mut buf).await?;
        if read == 0 {
            break;
        }

        let written = async {
            dest.write_all(&buf[..read]).await?;
            dest.flush().await
        }
        .await;

        if let Err(e) = written {
            drain(source).await;
            return Err(e);
        }
        total += read as u64;
    }

    dest.shutdown().await?;
    Ok(total)
}

async fn drain<R>(source: &mut R)
where
    R: AsyncRead + Unpin + ?Sized,
{
    if let Err(e) = tokio::io::copy(source, &mut tokio::io::sink()).await {
        tracing::debug!(target: "exec", "Error while discarding remaining output: {}", e);
    }
}
