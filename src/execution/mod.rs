//! Command execution engine.
//!
//! This module provides the two execution strategies:
//! - [`shell_blocking`]: run a command and block until it finishes
//! - [`shell`]: spawn a command and await its completion
//!
//! # Example
//!
//! ```no_run
//! use shell_runner::{shell_blocking, ShellOptions};
//!
//! let output = shell_blocking("echo hello", &ShellOptions::new().silent(true)).unwrap();
//! assert_eq!(output.as_deref(), Some("hello\n"));
//! ```

mod backend;
mod blocking;
mod prefix;
mod spawned;

pub use backend::{OsBackend, ProcessBackend};
pub use blocking::shell_blocking;
pub use spawned::shell;

use crate::error::ShellError;
use crate::options::NormalizedOptions;

/// Build the single-line error for a failed run.
///
/// The configured transform applies to error messages as well as output.
pub(crate) fn failure(opts: &NormalizedOptions, message: String) -> ShellError {
    ShellError::new(opts.apply_transform(message))
}

/// Map captured text to the caller-facing result: `None` when nothing was
/// produced.
pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
