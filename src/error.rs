//! Error type for shell-runner.

use thiserror::Error;

/// Error raised for any failed command run.
///
/// A single kind covers all failure causes: spawn failure, non-zero exit,
/// and timeout. The cause is only distinguishable from the message text.
/// Messages are truncated to their first line at construction; multi-line
/// shell diagnostics are noisy and only the summary line is surfaced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ShellError {
    message: String,
}

impl ShellError {
    /// Create an error from a message, keeping only the first line.
    pub fn new(message: impl AsRef<str>) -> Self {
        let message = message
            .as_ref()
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        Self { message }
    }

    /// The (single-line) error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convenience Result type for shell-runner operations.
pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_message_kept() {
        let err = ShellError::new("command not found: foo");
        assert_eq!(err.message(), "command not found: foo");
        assert_eq!(err.to_string(), "command not found: foo");
    }

    #[test]
    fn test_multi_line_message_truncated() {
        let err = ShellError::new("sh: exec failed\n  at spawn\n  at run");
        assert_eq!(err.message(), "sh: exec failed");
        assert!(!err.to_string().contains("at spawn"));
    }

    #[test]
    fn test_empty_message() {
        let err = ShellError::new("");
        assert_eq!(err.message(), "");
    }

    #[test]
    fn test_leading_newline() {
        let err = ShellError::new("\nsecond line only");
        assert_eq!(err.message(), "");
    }
}
