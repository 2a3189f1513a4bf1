//! Process execution against real child processes and real sinks.

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use depforge::core::DepforgeError;
use depforge::exec::{CaptureBuffer, ExecCommand, StreamSink};

#[tokio::test]
async fn test_failure_message_contains_exact_stderr() -> Result<()> {
    depforge::test_utils::init_test_logging(None);

    let err = ExecCommand::new("sh")
        .args(["-c", "printf 'line one\\nline two\\n' >&2; exit 3"])
        .execute()
        .await
        .unwrap_err();

    match err.downcast_ref::<DepforgeError>() {
        Some(DepforgeError::NonZeroExit {
            code,
            stderr,
            ..
        }) => {
            assert_eq!(*code, 3);
            assert_eq!(stderr.as_deref(), Some("line one\nline two\n"));
        }
        other => panic!("expected a non-zero exit, got {other:?}"),
    }
    assert!(err.to_string().contains("line one\nline two"));
    Ok(())
}

#[tokio::test]
async fn test_large_interleaved_output_is_fully_drained() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let out = temp.path().join("stdout.log");
    let err_buf = CaptureBuffer::new();

    // Far more than a pipe buffer on both streams at once.
    let script = "i=0; while [ $i -lt 5000 ]; do \
                  echo \"out $i 0123456789abcdef\"; echo \"err $i\" >&2; i=$((i+1)); done";
    let result = ExecCommand::new("sh")
        .args(["-c", script])
        .stdout(StreamSink::file(&out))
        .stderr(StreamSink::Buffer(err_buf.clone()))
        .execute()
        .await?;

    assert!(result.success());
    assert!(result.stderr_redirected);
    assert!(result.stderr.is_empty());

    let stdout = fs::read_to_string(&out)?;
    assert_eq!(stdout.lines().count(), 5000);
    assert_eq!(stdout.lines().last(), Some("out 4999 0123456789abcdef"));

    let stderr = err_buf.to_string_lossy();
    assert_eq!(stderr.lines().count(), 5000);
    assert!(stderr.starts_with("err 0\n"));
    Ok(())
}

#[tokio::test]
async fn test_redirected_stderr_failure_notes_custom_sink() -> Result<()> {
    let buf = CaptureBuffer::new();

    let err = ExecCommand::new("sh")
        .args(["-c", "echo boom >&2; exit 1"])
        .stderr(StreamSink::Buffer(buf.clone()))
        .execute()
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("stderr was redirected to a custom sink"), "{message}");
    assert!(!message.contains("boom"), "{message}");
    assert_eq!(buf.to_string_lossy(), "boom\n");
    Ok(())
}

#[tokio::test]
async fn test_post_exec_hook_runs_after_output_is_durable() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let out = temp.path().join("generated.txt");
    let hook_out = out.clone();
    let saw_content = Arc::new(AtomicBool::new(false));
    let flag = saw_content.clone();

    ExecCommand::new("sh")
        .args(["-c", "echo generated"])
        .stdout(StreamSink::file(&out))
        .post_exec(move || {
            let content = std::fs::read_to_string(&hook_out)?;
            flag.store(content == "generated\n", Ordering::SeqCst);
            std::fs::remove_file(&hook_out)?;
            Ok(())
        })
        .execute()
        .await?;

    assert!(saw_content.load(Ordering::SeqCst));
    assert!(!out.exists());
    Ok(())
}
