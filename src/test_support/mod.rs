//! Test doubles for the external tools the pipeline drives.
//!
//! ```rust,ignore
//! let mut runner = MockRunner::new();
//! runner.expect(
//!     CommandPattern::StartsWith("cmake".into()),
//!     RunResult::new("-- Configuring done", ""),
//! );
//! ```

pub mod fixtures;

use anyhow::Result;

use crate::util::process::{CommandRunner, ProcessBuilder, RunResult};

/// Pattern for matching rendered commands in `MockRunner`.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on the full command line.
    Exact(String),
    StartsWith(String),
    Contains(String),
    /// Regular expression match.
    Regex(String),
    Any,
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Expectation {
    pattern: CommandPattern,
    result: RunResult,
    times: Option<usize>,
    used: usize,
}

impl Expectation {
    fn available(&self) -> bool {
        self.times.map_or(true, |n| self.used < n)
    }
}

/// Scripted `CommandRunner`.
///
/// Every invocation is recorded. The first available expectation whose
/// pattern matches the rendered command supplies the result; unmatched
/// commands succeed silently.
#[derive(Debug, Default)]
pub struct MockRunner {
    expectations: Vec<Expectation>,
    calls: Vec<ProcessBuilder>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    pub fn expect(&mut self, pattern: CommandPattern, result: RunResult) -> &mut Self {
        self.expectations.push(Expectation {
            pattern,
            result,
            times: None,
            used: 0,
        });
        self
    }

    /// Like `expect`, but only for the next `n` matching commands.
    pub fn expect_times(
        &mut self,
        pattern: CommandPattern,
        result: RunResult,
        n: usize,
    ) -> &mut Self {
        self.expectations.push(Expectation {
            pattern,
            result,
            times: Some(n),
            used: 0,
        });
        self
    }

    /// Commands run so far, in order.
    pub fn calls(&self) -> &[ProcessBuilder] {
        &self.calls
    }

    /// Rendered command lines run so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.display_command()).collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<RunResult> {
        let line = cmd.display_command();
        self.calls.push(cmd.clone());

        for exp in &mut self.expectations {
            if exp.available() && exp.pattern.matches(&line) {
                exp.used += 1;
                return Ok(exp.result.clone());
            }
        }
        Ok(RunResult::new("", ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns() {
        assert!(CommandPattern::Exact("make all".into()).matches("make all"));
        assert!(!CommandPattern::Exact("make".into()).matches("make all"));
        assert!(CommandPattern::StartsWith("cmake".into()).matches("cmake -G Ninja ."));
        assert!(CommandPattern::Contains("msbuild".into()).matches("cmd /C x && msbuild a.sln"));
        assert!(CommandPattern::Regex(r"^ninja\b".into()).matches("ninja install"));
        assert!(!CommandPattern::Regex("(".into()).matches("anything"));
    }

    #[test]
    fn test_runner_records_and_answers() {
        let mut runner = MockRunner::new();
        runner.expect_times(
            CommandPattern::StartsWith("make".into()),
            RunResult::new("", "boom"),
            1,
        );

        let first = runner.run(&ProcessBuilder::new("make").arg("all")).unwrap();
        let second = runner.run(&ProcessBuilder::new("make").arg("all")).unwrap();

        assert!(!first.succeeded());
        assert!(second.succeeded());
        assert_eq!(runner.command_lines(), vec!["make all", "make all"]);
    }
}
