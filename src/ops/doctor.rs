//! Host and tool probing.
//!
//! Reports the host platform and, for each tool the run may invoke, where it
//! lives and what `--version` says. Probing is informational: a missing tool
//! is logged and the run continues, so the stage that actually needs the
//! tool is the one that fails.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::builder::context::BuildEnv;
use crate::core::{BuildPlan, BuildTool, HostPlatform};
use crate::util::process::{find_executable_in, CommandRunner};
use crate::util::shell::{Shell, Status};

/// Result of probing one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCheck {
    pub name: &'static str,
    pub path: Option<PathBuf>,
    /// First non-empty line of `<tool> --version`.
    pub version: Option<String>,
    pub duration: Duration,
}

impl ToolCheck {
    fn missing(name: &'static str) -> Self {
        ToolCheck {
            name,
            path: None,
            version: None,
            duration: Duration::ZERO,
        }
    }

    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Everything the probe found out.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub host: HostPlatform,
    pub checks: Vec<ToolCheck>,
    pub total_duration: Duration,
}

impl ProbeReport {
    pub fn check(&self, name: &str) -> Option<&ToolCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn missing_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.found()).count()
    }
}

/// Tools a local run with this plan invokes, in probe order.
pub fn tools_for(plan: &BuildPlan) -> Vec<&'static str> {
    let driver = match plan.build_tool {
        BuildTool::VisualStudio => "msbuild",
        BuildTool::Make => "make",
        BuildTool::Ninja => "ninja",
        BuildTool::NMake => "nmake",
    };
    vec!["cmake", driver]
}

/// Probe the host and the tools of `plan`. Never fails.
pub fn probe(
    plan: &BuildPlan,
    host: &HostPlatform,
    env: &BuildEnv,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> ProbeReport {
    let start = Instant::now();
    shell.status(Status::Probing, format!("host {} {}", host.os, host.arch));

    let checks: Vec<ToolCheck> = tools_for(plan)
        .into_iter()
        .map(|tool| {
            let check = check_tool(tool, env, runner);
            match (&check.path, &check.version) {
                (Some(path), Some(version)) => shell.status(
                    Status::Probing,
                    format!("{} at {} ({})", tool, path.display(), version),
                ),
                (Some(path), None) => {
                    shell.status(Status::Probing, format!("{} at {}", tool, path.display()))
                }
                (None, _) => shell.warn(format!("{} not found on PATH", tool)),
            }
            check
        })
        .collect();

    ProbeReport {
        host: host.clone(),
        checks,
        total_duration: start.elapsed(),
    }
}

fn check_tool(name: &'static str, env: &BuildEnv, runner: &mut dyn CommandRunner) -> ToolCheck {
    let start = Instant::now();
    let Some(path) = find_executable_in(name, env.path_var(), env.working_dir()) else {
        return ToolCheck::missing(name);
    };

    let version = match runner.run(&env.command(&path).arg("--version")) {
        Ok(result) => first_line(&result.stdout).or_else(|| first_line(&result.stderr)),
        Err(e) => {
            tracing::debug!("could not query {} version: {:#}", name, e);
            None
        }
    };

    ToolCheck {
        name,
        path: Some(path),
        version,
        duration: start.elapsed(),
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
