//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    env_clear: bool,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            env_clear: false,
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Run with exactly the given environment instead of inheriting ours.
    pub fn env_exact(mut self, vars: &BTreeMap<String, String>) -> Self {
        self.env_clear = true;
        self.env = vars.clone();
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Get an environment variable set on this builder.
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if self.env_clear {
            cmd.env_clear();
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;

        Ok(output)
    }

    /// Display the command for logs and error messages.
    ///
    /// Arguments containing spaces are double-quoted.
    pub fn display_command(&self) -> String {
        let mut parts = vec![quote_display(&self.program.display().to_string())];
        parts.extend(self.args.iter().map(|a| quote_display(a)));
        parts.join(" ")
    }
}

fn quote_display(s: &str) -> String {
    if s.is_empty() || s.contains(' ') {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// Captured output of one external command.
///
/// Success is judged from stderr, not from the exit status: the configure
/// and build tools do not report failures through exit codes consistently.
/// Tools that print warnings on stderr are therefore treated as failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, when the process reported one. Informational only.
    pub status: Option<i32>,
}

impl RunResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        RunResult {
            stdout: stdout.into(),
            stderr: stderr.into(),
            status: Some(0),
        }
    }

    /// True when the command printed nothing but whitespace on stderr.
    pub fn succeeded(&self) -> bool {
        self.stderr.trim().is_empty()
    }

    fn from_output(output: &Output) -> Self {
        RunResult {
            stdout: normalize_newlines(&String::from_utf8_lossy(&output.stdout)),
            stderr: normalize_newlines(&String::from_utf8_lossy(&output.stderr)),
            status: output.status.code(),
        }
    }
}

/// Convert CRLF and lone CR line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Executes external commands for the pipeline stages.
///
/// Implementations never fail on a nonzero exit status; only a command
/// that cannot be started at all is an error.
pub trait CommandRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<RunResult>;
}

/// Runs commands as real child processes, one at a time.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<RunResult> {
        let output = cmd.exec()?;
        let result = RunResult::from_output(&output);
        tracing::debug!(
            "`{}` exited with {:?}",
            cmd.display_command(),
            result.status
        );
        Ok(result)
    }
}

/// Find an executable in a specific PATH value.
pub fn find_executable_in(name: &str, path_var: &str, cwd: &Path) -> Option<PathBuf> {
    which::which_in(name, Some(path_var), cwd).ok()
}
