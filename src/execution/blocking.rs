//! Synchronous command execution.

use std::io::{Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::backend::shell_command;
use super::{failure, non_empty};
use crate::options::{NormalizedOptions, ShellOptions, StreamMode};
use crate::Result;

/// Interval between exit polls while waiting on the child.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run a shell command, blocking until it finishes.
///
/// Returns the captured stdout text, or `None` if the command produced no
/// output (or output was not captured because piping was disabled). Unless
/// running silently, the captured text is also echoed to the real stdout —
/// the result is both returned and written to the terminal.
///
/// Fails with a single-line [`crate::ShellError`] on spawn failure, non-zero
/// exit, or timeout.
pub fn shell_blocking(command: &str, options: &ShellOptions) -> Result<Option<String>> {
    run(command, &options.normalize())
}

fn run(command: &str, opts: &NormalizedOptions) -> Result<Option<String>> {
    debug!(command, "running blocking command");
    let start = Instant::now();

    let mut cmd = shell_command(command, opts);
    let mut child = opts
        .backend
        .spawn_blocking(&mut cmd)
        .map_err(|e| failure(opts, format!("failed to run '{}': {}", command, e)))?;

    // Drain pipes off-thread so a chatty child can't fill the pipe buffer
    // and stall while we poll for exit.
    let stdout_drain = child.stdout.take().map(spawn_drain);
    let stderr_drain = child.stderr.take().map(spawn_drain);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                return Err(failure(
                    opts,
                    format!("failed waiting on '{}': {}", command, e),
                ));
            }
        }

        if let Some(limit) = opts.timeout {
            if start.elapsed() > limit {
                warn!(command, "command timed out; killing child");
                let _ = child.kill();
                let _ = child.wait();
                return Err(failure(
                    opts,
                    format!("'{}' timed out after {:.1}s", command, limit.as_secs_f64()),
                ));
            }
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = join_drain(stdout_drain);
    let stderr = join_drain(stderr_drain);

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        let detail = stderr.lines().next().unwrap_or_default();
        let msg = if detail.is_empty() {
            format!("'{}' exited with code {}", command, code)
        } else {
            format!("'{}' exited with code {}: {}", command, code, detail)
        };
        return Err(failure(opts, msg));
    }

    let output = opts.apply_transform(stdout);

    if !opts.silent && opts.streams == StreamMode::Piped {
        print!("{}", output);
        let _ = std::io::stdout().flush();
    }

    Ok(non_empty(output))
}

fn spawn_drain<R: Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_drain(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_blocking_captures_output() {
        let out = shell_blocking("echo hello", &ShellOptions::new().silent(true)).unwrap();
        assert_eq!(out.as_deref(), Some("hello\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_blocking_no_output_is_none() {
        let out = shell_blocking("true", &ShellOptions::new().silent(true)).unwrap();
        assert!(out.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_blocking_nonzero_exit_fails() {
        let err = shell_blocking("exit 7", &ShellOptions::new().silent(true)).unwrap_err();
        assert!(err.message().contains('7'));
        assert!(err.message().contains("exit 7"));
    }

    #[cfg(unix)]
    #[test]
    fn test_blocking_stderr_detail_in_message() {
        let err = shell_blocking(
            "echo boom >&2; exit 2",
            &ShellOptions::new().silent(true),
        )
        .unwrap_err();
        assert!(err.message().contains("boom"));
    }

    #[cfg(unix)]
    #[test]
    fn test_blocking_timeout_kills() {
        let start = Instant::now();
        let err = shell_blocking(
            "sleep 5",
            &ShellOptions::new()
                .silent(true)
                .timeout(Duration::from_millis(200)),
        )
        .unwrap_err();
        assert!(err.message().contains("timed out"));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
