//! The orchestrator: one run from raw options to a built tree.
//!
//! ```text
//! Init -> Parsed -> DockerDelegated ----------------------------> Done
//!                -> PlatformConfigured -> Configured -> Built -> Cleaned -> Done
//! (any) -> Failed
//! ```
//!
//! Every failure is caught here, logged with the run's log file and turned
//! into a `RunOutcome`. The environment's working directory is put back to
//! the source directory on every exit path, and the build directory is only
//! removed after a successful build.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::{self, BuildEnv};
use crate::core::{BuildPlan, HostPlatform, RawOptions};
use crate::ops::docker;
use crate::ops::doctor;
use crate::ops::resolve::{resolve_plan, ConfigSummary};
use crate::util::config::{global_config_path, load_config, project_config_path};
use crate::util::fs::{absolutize, remove_dir_all_if_exists};
use crate::util::process::CommandRunner;
use crate::util::shell::{timestamp, ConsoleSink, Shell, Status, Verbosity};

/// Orchestrator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Parsed,
    DockerDelegated,
    PlatformConfigured,
    Configured,
    Built,
    Cleaned,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Process-level inputs of a run that are not options.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub host: HostPlatform,
    /// Directory the run was started from.
    pub cwd: PathBuf,
    /// `~/.cmbuild/config.toml`, when a home directory exists.
    pub global_config: Option<PathBuf>,
    /// Environment handed to every external tool.
    pub vars: Vec<(String, String)>,
}

impl RunContext {
    /// Capture the context of the current process.
    pub fn from_process() -> Result<Self> {
        Ok(RunContext {
            host: HostPlatform::detect(),
            cwd: std::env::current_dir().context("failed to read current directory")?,
            global_config: global_config_path(),
            vars: std::env::vars().collect(),
        })
    }
}

/// How a run ended.
#[derive(Debug)]
pub struct RunOutcome {
    /// `Done` or `Failed`.
    pub stage: Stage,
    /// Last state reached before finishing or failing.
    pub last_stage: Stage,
    pub error: Option<anyhow::Error>,
    pub log_file: Option<PathBuf>,
    /// Working directory of the environment when the run returned.
    pub working_dir: PathBuf,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.stage == Stage::Done
    }
}

/// Run the whole pipeline.
pub fn run(options: &RawOptions, ctx: &RunContext, runner: &mut dyn CommandRunner) -> RunOutcome {
    let source_dir = absolutize(options.source_dir.as_deref().unwrap_or(&ctx.cwd), &ctx.cwd);
    let shell = open_shell(options, &source_dir);
    shell.note(format!("start building at {}", timestamp()));

    let config = load_config(ctx.global_config.as_deref(), &project_config_path(&source_dir));
    let plan = match resolve_plan(options, &ctx.host, &config, &ctx.cwd) {
        Ok(plan) => plan,
        Err(e) => {
            let err = anyhow::Error::new(e);
            return fail(&shell, &source_dir, Stage::Init, err, source_dir.clone());
        }
    };
    tracing::debug!("stage {} -> {}", Stage::Init, Stage::Parsed);

    let mut env = BuildEnv::from_vars(plan.platform, ctx.vars.iter().cloned(), &plan.source_dir);
    let mut stage = Stage::Parsed;
    let result = execute(&plan, ctx, &mut env, runner, &shell, &mut stage);

    env.set_working_dir(&plan.source_dir);
    tracing::debug!("working directory restored to {}", plan.source_dir.display());

    match result {
        Ok(()) => {
            shell.status(Status::Finished, format!("done building at {}", timestamp()));
            RunOutcome {
                stage: Stage::Done,
                last_stage: stage,
                error: None,
                log_file: shell.log_path().map(Path::to_path_buf),
                working_dir: env.working_dir().to_path_buf(),
            }
        }
        Err(err) => fail(
            &shell,
            &plan.source_dir,
            stage,
            err,
            env.working_dir().to_path_buf(),
        ),
    }
}

fn open_shell(options: &RawOptions, source_dir: &Path) -> Shell {
    let verbosity = if options.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let sink = if options.console_stdout {
        ConsoleSink::Stdout
    } else {
        ConsoleSink::Stderr
    };

    if options.no_log_file || options.print_plan {
        return Shell::new(verbosity, options.no_color).with_sink(sink);
    }
    match Shell::with_log_file(verbosity, options.no_color, source_dir) {
        Ok(shell) => shell.with_sink(sink),
        Err(e) => {
            let shell = Shell::new(verbosity, options.no_color).with_sink(sink);
            shell.warn(format!("{:#}, logging to console only", e));
            shell
        }
    }
}

fn execute(
    plan: &BuildPlan,
    ctx: &RunContext,
    env: &mut BuildEnv,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
    stage: &mut Stage,
) -> Result<()> {
    let mut advance = |next: Stage| {
        tracing::debug!("stage {} -> {}", stage, next);
        *stage = next;
    };

    if let Some(delegation) = &plan.docker {
        log_summary(plan, None, shell);
        if plan.print_plan {
            return print_plan(plan, None);
        }
        docker::delegate(plan, delegation, env, runner, shell)?;
        advance(Stage::DockerDelegated);
        return Ok(());
    }

    let toolchain = builder::select_toolchain(plan, &ctx.host)?;
    log_summary(plan, Some(&toolchain), shell);
    if plan.print_plan {
        return print_plan(plan, Some(&toolchain));
    }
    let probe = doctor::probe(plan, &ctx.host, env, runner, shell);
    tracing::debug!(
        "probe finished in {:?}, {} tool(s) missing",
        probe.total_duration,
        probe.missing_count()
    );
    advance(Stage::PlatformConfigured);

    let report = builder::configure(plan, &toolchain, env, runner, shell)?;
    let toolchain = match report.tool_root.clone() {
        Some(root) => toolchain.with_tool_root(root),
        None => toolchain,
    };
    advance(Stage::Configured);

    let candidates = builder::resolve_targets(plan, &report.stdout, shell)?;
    builder::build(plan, &toolchain, &candidates, env, runner, shell)?;
    advance(Stage::Built);

    if plan.clean_after {
        env.set_working_dir(&plan.source_dir);
        if remove_dir_all_if_exists(&plan.build_dir)? {
            shell.status(Status::Removed, plan.build_dir.display());
        }
        advance(Stage::Cleaned);
    }

    Ok(())
}

fn log_summary(plan: &BuildPlan, toolchain: Option<&builder::ToolchainDescriptor>, shell: &Shell) {
    if shell.is_verbose() {
        shell.banner("summary");
    }
    for line in ConfigSummary::new(plan, toolchain).lines() {
        shell.debug(line);
    }
}

fn print_plan(plan: &BuildPlan, toolchain: Option<&builder::ToolchainDescriptor>) -> Result<()> {
    let summary = ConfigSummary::new(plan, toolchain);
    let json = serde_json::to_string_pretty(&summary).context("failed to serialize plan")?;
    println!("{}", json);
    Ok(())
}

fn fail(
    shell: &Shell,
    source_dir: &Path,
    last_stage: Stage,
    err: anyhow::Error,
    working_dir: PathBuf,
) -> RunOutcome {
    tracing::debug!("stage {} -> {}", last_stage, Stage::Failed);
    if let Some(kind) = crate::core::build_error(&err).map(|e| e.kind()) {
        tracing::debug!("{} error", kind);
    }

    shell.banner("failed");
    shell.error(format!(
        "failed building {} due to \"{:#}\"",
        source_dir.display(),
        err
    ));
    if let Some(path) = shell.log_path() {
        shell.note(format!("see more in log file {}", path.display()));
    }
    shell.note(format!("exit at {}", timestamp()));

    RunOutcome {
        stage: Stage::Failed,
        last_stage,
        error: Some(err),
        log_file: shell.log_path().map(Path::to_path_buf),
        working_dir,
    }
}
