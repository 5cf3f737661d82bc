//! Run options and their normalization.
//!
//! Callers build a [`ShellOptions`] value; the runners derive a fully
//! populated [`NormalizedOptions`] from it before dispatch. Normalization
//! never mutates the caller's value and never fails.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use crate::execution::{OsBackend, ProcessBackend};

/// Environment variable injected into every child to force colored output.
pub const COLOR_ENV_VAR: &str = "FORCE_COLOR";

/// Transform applied to captured output and to error messages.
pub type OutputTransform = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Disposition of the child's standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// stdin, stdout, and stderr are all inherited from the parent.
    Inherit,
    /// stdin is inherited; stdout and stderr are discarded.
    Silenced,
    /// stdin is inherited; stdout and stderr are piped for capture.
    Piped,
}

impl StreamMode {
    pub(crate) fn stdin(&self) -> Stdio {
        Stdio::inherit()
    }

    pub(crate) fn stdout(&self) -> Stdio {
        match self {
            StreamMode::Inherit => Stdio::inherit(),
            StreamMode::Silenced => Stdio::null(),
            StreamMode::Piped => Stdio::piped(),
        }
    }

    pub(crate) fn stderr(&self) -> Stdio {
        match self {
            StreamMode::Inherit => Stdio::inherit(),
            StreamMode::Silenced => Stdio::null(),
            StreamMode::Piped => Stdio::piped(),
        }
    }
}

/// Options for running a shell command.
///
/// All fields are optional; [`ShellOptions::normalize`] fills the defaults.
#[derive(Clone, Default)]
pub struct ShellOptions {
    /// Working directory override (default: caller's current directory).
    pub cwd: Option<PathBuf>,
    /// Environment variables set for the child, overriding inherited ones.
    pub env: HashMap<String, String>,
    /// Maximum run time; unset means unlimited.
    pub timeout: Option<Duration>,
    /// Disable piping: let the child write to the parent's streams directly.
    pub nopipe: bool,
    /// Suppress echoing and inherited output.
    pub silent: bool,
    /// Transform applied to captured output and error messages.
    pub transform: Option<OutputTransform>,
    /// Label prepended to every forwarded output chunk (async mode only).
    pub prefix: Option<String>,
    /// Spawn seam override; tests substitute a fake backend here.
    pub backend: Option<Arc<dyn ProcessBackend>>,
}

impl ShellOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// Set the run timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Disable piping of the child's output streams.
    pub fn nopipe(mut self, nopipe: bool) -> Self {
        self.nopipe = nopipe;
        self
    }

    /// Suppress echoing and inherited output.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Set the output transform.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Set the chunk prefix label.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Override the process backend.
    pub fn backend(mut self, backend: Arc<dyn ProcessBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Derive fully-populated options.
    ///
    /// The child environment is the parent's environment overlaid with the
    /// caller's map, then [`COLOR_ENV_VAR`] is injected unconditionally.
    /// Stream disposition follows the nopipe/silent flags, except that a
    /// configured prefix always forces piping since the streams must be
    /// intercepted to be rewritten.
    pub fn normalize(&self) -> NormalizedOptions {
        let mut env: HashMap<String, String> = std::env::vars().collect();
        env.extend(self.env.clone());
        env.insert(COLOR_ENV_VAR.to_string(), "1".to_string());

        let streams = if self.prefix.is_some() {
            StreamMode::Piped
        } else if self.nopipe && self.silent {
            StreamMode::Silenced
        } else if self.nopipe {
            StreamMode::Inherit
        } else {
            StreamMode::Piped
        };

        NormalizedOptions {
            cwd: self.cwd.clone(),
            env,
            timeout: self.timeout,
            streams,
            silent: self.silent,
            transform: self.transform.clone(),
            prefix: self.prefix.clone(),
            backend: self
                .backend
                .clone()
                .unwrap_or_else(|| Arc::new(OsBackend)),
        }
    }
}

impl fmt::Debug for ShellOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellOptions")
            .field("cwd", &self.cwd)
            .field("env", &self.env)
            .field("timeout", &self.timeout)
            .field("nopipe", &self.nopipe)
            .field("silent", &self.silent)
            .field("transform", &self.transform.is_some())
            .field("prefix", &self.prefix)
            .field("backend", &self.backend.is_some())
            .finish()
    }
}

/// Fully-populated options, derived by [`ShellOptions::normalize`].
#[derive(Clone)]
pub struct NormalizedOptions {
    pub cwd: Option<PathBuf>,
    /// Complete child environment: inherited, caller overrides, color flag.
    pub env: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub streams: StreamMode,
    pub silent: bool,
    pub transform: Option<OutputTransform>,
    pub prefix: Option<String>,
    pub backend: Arc<dyn ProcessBackend>,
}

impl NormalizedOptions {
    /// Apply the configured transform to `text`, if any.
    pub(crate) fn apply_transform(&self, text: String) -> String {
        match &self.transform {
            Some(f) => f(text),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder_chain() {
        let opts = ShellOptions::new()
            .cwd("/project")
            .env("RUST_LOG", "debug")
            .timeout(Duration::from_secs(60))
            .silent(true)
            .prefix("build");

        assert_eq!(opts.cwd, Some(PathBuf::from("/project")));
        assert_eq!(opts.env.get("RUST_LOG"), Some(&"debug".to_string()));
        assert_eq!(opts.timeout, Some(Duration::from_secs(60)));
        assert!(opts.silent);
        assert_eq!(opts.prefix.as_deref(), Some("build"));
    }

    #[test]
    fn test_options_envs() {
        let vars = [("KEY1", "val1"), ("KEY2", "val2")];
        let opts = ShellOptions::new().envs(vars);

        assert_eq!(opts.env.len(), 2);
        assert_eq!(opts.env.get("KEY1"), Some(&"val1".to_string()));
    }

    #[test]
    fn test_normalize_injects_color_flag() {
        let norm = ShellOptions::new().normalize();
        assert_eq!(norm.env.get(COLOR_ENV_VAR), Some(&"1".to_string()));
    }

    #[test]
    fn test_normalize_color_flag_wins_over_caller() {
        let norm = ShellOptions::new().env(COLOR_ENV_VAR, "0").normalize();
        assert_eq!(norm.env.get(COLOR_ENV_VAR), Some(&"1".to_string()));
    }

    #[test]
    fn test_normalize_caller_env_wins_over_inherited() {
        // PATH is always present in the inherited environment
        let norm = ShellOptions::new().env("PATH", "/custom/bin").normalize();
        assert_eq!(norm.env.get("PATH"), Some(&"/custom/bin".to_string()));
    }

    #[test]
    fn test_normalize_inherits_parent_env() {
        std::env::set_var("SHELL_RUNNER_TEST_INHERIT", "yes");
        let norm = ShellOptions::new().normalize();
        assert_eq!(
            norm.env.get("SHELL_RUNNER_TEST_INHERIT"),
            Some(&"yes".to_string())
        );
        std::env::remove_var("SHELL_RUNNER_TEST_INHERIT");
    }

    #[test]
    fn test_normalize_does_not_mutate_caller() {
        let opts = ShellOptions::new().env("A", "1");
        let _ = opts.normalize();
        assert_eq!(opts.env.len(), 1);
        assert!(!opts.env.contains_key(COLOR_ENV_VAR));
    }

    #[test]
    fn test_stream_mode_default_is_piped() {
        assert_eq!(ShellOptions::new().normalize().streams, StreamMode::Piped);
    }

    #[test]
    fn test_stream_mode_nopipe_inherits() {
        let norm = ShellOptions::new().nopipe(true).normalize();
        assert_eq!(norm.streams, StreamMode::Inherit);
    }

    #[test]
    fn test_stream_mode_nopipe_silent_silences() {
        let norm = ShellOptions::new().nopipe(true).silent(true).normalize();
        assert_eq!(norm.streams, StreamMode::Silenced);
    }

    #[test]
    fn test_stream_mode_prefix_forces_pipe() {
        let norm = ShellOptions::new().nopipe(true).prefix("web").normalize();
        assert_eq!(norm.streams, StreamMode::Piped);
    }

    #[test]
    fn test_apply_transform() {
        let norm = ShellOptions::new()
            .transform(|s| s.to_uppercase())
            .normalize();
        assert_eq!(norm.apply_transform("ok".to_string()), "OK");

        let plain = ShellOptions::new().normalize();
        assert_eq!(plain.apply_transform("ok".to_string()), "ok");
    }
}
