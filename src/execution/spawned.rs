//! Asynchronous command execution.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::{debug, warn};

use super::backend::shell_command;
use super::prefix::prefix_chunk;
use super::{failure, non_empty};
use crate::options::{NormalizedOptions, ShellOptions};
use crate::Result;

/// Buffer size for reading child output.
const READ_BUFFER_SIZE: usize = 4096;

/// Spawn a shell command and await its completion.
///
/// Resolves with the captured stdout text on a clean exit (`None` when the
/// command produced no output), or fails with a single-line
/// [`crate::ShellError`] on spawn failure, non-zero exit, or timeout. The
/// result settles exactly once, and only after all stream data has been
/// handled.
///
/// When a line prefix is configured, every chunk read from stdout or stderr
/// is forwarded to the parent's corresponding stream with `"<prefix> "`
/// prepended.
pub async fn shell(command: &str, options: &ShellOptions) -> Result<Option<String>> {
    run(command, &options.normalize()).await
}

async fn run(command: &str, opts: &NormalizedOptions) -> Result<Option<String>> {
    debug!(command, "spawning command");

    let mut cmd = Command::from(shell_command(command, opts));
    cmd.kill_on_drop(true);

    let mut child = opts
        .backend
        .spawn(&mut cmd)
        .map_err(|e| failure(opts, format!("failed to spawn '{}': {}", command, e)))?;

    let stdout_task = child.stdout.take().map(|stream| {
        let prefix = opts.prefix.clone();
        tokio::spawn(async move { capture_stdout(stream, prefix).await })
    });
    let stderr_task = child.stderr.take().map(|stream| {
        let prefix = opts.prefix.clone();
        tokio::spawn(async move { forward_stderr(stream, prefix).await })
    });

    // The timeout timer is dropped as soon as the wait completes, so a kill
    // can never fire against a later process.
    let waited = match opts.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(res) => res,
            Err(_) => {
                warn!(command, "command timed out; killing child");
                let _ = child.kill().await;
                // Let the readers hit EOF so pending prefixed chunks flush.
                if let Some(task) = stdout_task {
                    let _ = task.await;
                }
                if let Some(task) = stderr_task {
                    let _ = task.await;
                }
                return Err(failure(
                    opts,
                    format!("'{}' timed out after {:.1}s", command, limit.as_secs_f64()),
                ));
            }
        },
        None => child.wait().await,
    };

    let status =
        waited.map_err(|e| failure(opts, format!("failed waiting on '{}': {}", command, e)))?;

    // Join the readers before settling: resolution happens after all stream
    // data for this invocation has been observed.
    let captured = match stdout_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };
    if let Some(task) = stderr_task {
        let _ = task.await;
    }

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(failure(
            opts,
            format!("'{}' exited with code {}", command, code),
        ));
    }

    Ok(non_empty(opts.apply_transform(captured)))
}

/// Read stdout to EOF, accumulating the full text.
///
/// With a prefix configured, each chunk is also rewritten and forwarded to
/// the parent's stdout as it arrives.
async fn capture_stdout(mut stream: ChildStdout, prefix: Option<String>) -> String {
    let mut captured = String::new();
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]);
                if let Some(prefix) = &prefix {
                    let mut out = tokio::io::stdout();
                    let _ = out.write_all(prefix_chunk(prefix, &chunk).as_bytes()).await;
                    let _ = out.flush().await;
                }
                captured.push_str(&chunk);
            }
        }
    }

    captured
}

/// Consume stderr so the pipe buffer can't fill.
///
/// With a prefix configured, chunks are rewritten and forwarded to the
/// parent's stderr; otherwise they are logged at debug.
async fn forward_stderr(mut stream: ChildStderr, prefix: Option<String>) {
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]);
                if let Some(prefix) = &prefix {
                    let mut err = tokio::io::stderr();
                    let _ = err.write_all(prefix_chunk(prefix, &chunk).as_bytes()).await;
                    let _ = err.flush().await;
                } else {
                    debug!("stderr: {}", chunk.trim_end());
                }
            }
        }
    }
}
