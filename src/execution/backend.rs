//! Spawn seam and platform shell selection.

use std::io;
use std::process::{Child as StdChild, Command as StdCommand};

use tokio::process::{Child, Command};

use crate::options::NormalizedOptions;

/// Seam over the OS spawn primitives.
///
/// The runners go through this trait instead of calling `spawn` directly so
/// tests can substitute a fake. [`OsBackend`] is the default passthrough.
pub trait ProcessBackend: Send + Sync {
    /// Spawn the shell invocation for the blocking runner.
    fn spawn_blocking(&self, cmd: &mut StdCommand) -> io::Result<StdChild>;

    /// Spawn the shell invocation for the asynchronous runner.
    fn spawn(&self, cmd: &mut Command) -> io::Result<Child>;
}

/// Real OS process spawning.
pub struct OsBackend;

impl ProcessBackend for OsBackend {
    fn spawn_blocking(&self, cmd: &mut StdCommand) -> io::Result<StdChild> {
        cmd.spawn()
    }

    fn spawn(&self, cmd: &mut Command) -> io::Result<Child> {
        cmd.spawn()
    }
}

/// Build the platform shell invocation for `command`.
///
/// The command string is handed to the shell verbatim: `sh -c` on Unix,
/// `cmd /C` on Windows. Working directory, environment, and stream
/// disposition come from the normalized options. The environment is set
/// from scratch since the normalizer already merged in the parent's.
pub(crate) fn shell_command(command: &str, opts: &NormalizedOptions) -> StdCommand {
    let mut cmd = if cfg!(windows) {
        let mut c = StdCommand::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = StdCommand::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.env_clear().envs(&opts.env);

    if let Some(dir) = &opts.cwd {
        cmd.current_dir(dir);
    }

    cmd.stdin(opts.streams.stdin())
        .stdout(opts.streams.stdout())
        .stderr(opts.streams.stderr());

    cmd
}
