//! # shell-runner
//!
//! Dual-mode shell command runner with output capture and prefixing.
//!
//! This crate is a thin convenience layer over OS process spawning: it runs
//! a shell command either synchronously (blocking until completion) or
//! asynchronously (awaitable), captures or streams its output, and
//! normalizes every failure into a single error type.
//!
//! ## Features
//!
//! - **Two strategies**: [`shell_blocking`] blocks the calling thread;
//!   [`shell`] resolves a future on process exit
//! - **Output capture**: stdout is captured and returned as text, or `None`
//!   when the command produced nothing
//! - **Prefixing**: forwarded output chunks can be labeled to disambiguate
//!   interleaved output from concurrent commands
//! - **Timeouts**: a configured timeout forcibly terminates the child
//!
//! ## Quick Start
//!
//! ```no_run
//! use shell_runner::{shell, ShellOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> shell_runner::Result<()> {
//!     // Initialize logging
//!     shell_runner::logging::try_init().ok();
//!
//!     let opts = ShellOptions::new()
//!         .timeout(Duration::from_secs(30))
//!         .prefix("build");
//!
//!     let output = shell("cargo build 2>&1", &opts).await?;
//!     println!("captured: {:?}", output);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod execution;
pub mod logging;
pub mod options;

// Re-export commonly used types
pub use error::{Result, ShellError};
pub use execution::{shell, shell_blocking, OsBackend, ProcessBackend};
pub use options::{NormalizedOptions, OutputTransform, ShellOptions, StreamMode, COLOR_ENV_VAR};
