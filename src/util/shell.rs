//! Run-scoped output and log file management.
//!
//! One `Shell` is created per run and passed to every stage. It prints
//! status lines to the console and mirrors each line into the run's log
//! file. The file is owned here and closed when the shell is dropped.
//!
//! # Design Principles
//!
//! 1. **Stages never write to the console directly** - Shell handles all formatting
//! 2. **The log file gets everything** - debug lines reach the console only when verbose
//! 3. **No global state** - dropping the shell releases the log file

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Default: status messages only
    #[default]
    Normal,
    /// --verbose: configuration dump and raw tool output on the console
    Verbose,
}

/// Status types for output messages.
///
/// Shell handles all formatting - callers just specify the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Finished,
    Removed,
    Located,

    // In-progress statuses (cyan)
    Configuring,
    Building,
    Running,
    Probing,

    // Info statuses (blue/default)
    Info,
    Debug,

    // Warning statuses (yellow)
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    /// Get the display text for this status.
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Located => "Located",
            Status::Configuring => "Configuring",
            Status::Building => "Building",
            Status::Running => "Running",
            Status::Probing => "Probing",
            Status::Info => "Info",
            Status::Debug => "Debug",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Level written into the log file.
    fn level(&self) -> &'static str {
        match self {
            Status::Debug => "DEBUG",
            Status::Warning => "WARN",
            Status::Error => "ERROR",
            _ => "INFO",
        }
    }

    /// Get the ANSI color code for this status.
    fn color_code(&self) -> &'static str {
        match self {
            // Success: bold green
            Status::Finished | Status::Removed | Status::Located => "\x1b[1;32m",
            // In-progress: bold cyan
            Status::Configuring | Status::Building | Status::Running | Status::Probing => {
                "\x1b[1;36m"
            }
            // Info: bold blue
            Status::Info | Status::Debug => "\x1b[1;34m",
            // Warning: bold yellow
            Status::Warning => "\x1b[1;33m",
            // Error: bold red
            Status::Error => "\x1b[1;31m",
        }
    }

    /// Get the width for alignment (12 characters).
    fn width(&self) -> usize {
        12
    }
}

/// Where console lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleSink {
    /// Everything on stderr.
    #[default]
    Stderr,
    /// Errors on stderr, everything else on stdout.
    Stdout,
}

/// An open run log.
#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

/// Central output context for one run.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    sink: ConsoleSink,
    use_color: bool,
    log: Mutex<Option<LogFile>>,
    log_path: Option<PathBuf>,
}

impl Shell {
    /// Create a console-only shell.
    pub fn new(verbosity: Verbosity, no_color: bool) -> Self {
        Shell {
            verbosity,
            sink: ConsoleSink::Stderr,
            use_color: !no_color && io::stderr().is_terminal(),
            log: Mutex::new(None),
            log_path: None,
        }
    }

    /// Create a shell that also writes `build_<timestamp>.log` into `dir`.
    pub fn with_log_file(verbosity: Verbosity, no_color: bool, dir: &Path) -> Result<Self> {
        let path = dir.join(format!("build_{}.log", timestamp_word()));
        let file = File::create(&path)
            .with_context(|| format!("failed to create log file: {}", path.display()))?;

        let mut shell = Shell::new(verbosity, no_color);
        shell.log = Mutex::new(Some(LogFile {
            path: path.clone(),
            writer: BufWriter::new(file),
        }));
        shell.log_path = Some(path);
        Ok(shell)
    }

    /// Route console output to `sink`.
    pub fn with_sink(mut self, sink: ConsoleSink) -> Self {
        if sink == ConsoleSink::Stdout && self.use_color {
            self.use_color = io::stdout().is_terminal();
        }
        self.sink = sink;
        self
    }

    /// Path of the log file, if one is being written.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Check if shell is in verbose mode.
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    pub fn status(&self, status: Status, msg: impl Display) {
        let msg = msg.to_string();
        self.write_log(status.level(), &msg);

        if status == Status::Debug && !self.is_verbose() {
            return;
        }
        self.emit(status, &format!("{} {}", self.format_status(status), msg));
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a debug message (console only when verbose).
    pub fn debug(&self, msg: impl Display) {
        self.status(Status::Debug, msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Print a section banner.
    pub fn banner(&self, title: impl Display) {
        let rule = "#".repeat(94);
        let title = format!("# {}", title);
        for line in [rule.as_str(), title.as_str(), rule.as_str()] {
            self.write_log("INFO", line);
            self.emit(Status::Info, line);
        }
    }

    /// Record the captured streams of an external tool.
    ///
    /// Stdout is debug output, stderr is reported as an error.
    pub fn tool_output(&self, stdout: &str, stderr: &str) {
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            self.debug(line);
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            self.error(line);
        }
    }

    /// Flush and close the log file. Later messages go to the console only.
    pub fn close(&self) {
        if let Ok(mut guard) = self.log.lock() {
            if let Some(mut log) = guard.take() {
                let _ = log.writer.flush();
            }
        }
    }

    fn emit(&self, status: Status, line: &str) {
        if self.on_stderr(status) {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn on_stderr(&self, status: Status) -> bool {
        self.sink == ConsoleSink::Stderr || status == Status::Error
    }

    fn write_log(&self, level: &str, msg: &str) {
        if let Ok(mut guard) = self.log.lock() {
            if let Some(log) = guard.as_mut() {
                if writeln!(log.writer, "{} [{}] {}", timestamp(), level, msg).is_err() {
                    tracing::warn!("failed to write log file {}", log.path.display());
                }
            }
        }
    }

    /// Format a status prefix with optional color.
    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        let width = status.width();

        if self.use_color {
            let color = status.color_code();
            format!("{}{:>width$}\x1b[0m", color, text, width = width)
        } else {
            format!("{:>width$}", text, width = width)
        }
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.close();
    }
}

/// Timestamp for messages: `2024/01/31_13:05:09`.
pub fn timestamp() -> String {
    Local::now().format("%Y/%m/%d_%H:%M:%S").to_string()
}

/// Timestamp usable in file names: `2024-01-31_13-05-09`.
pub fn timestamp_word() -> String {
    Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}
