//! Build stage: drives the platform build tool over the resolved units.

use anyhow::Result;

use crate::builder::context::BuildEnv;
use crate::builder::toolchain::ToolchainDescriptor;
use crate::core::{BuildError, BuildPlan, SolutionCandidate};
use crate::util::process::{CommandRunner, ProcessBuilder, RunResult};
use crate::util::shell::{Shell, Status};

/// Run one external tool, log its output and fail on stderr content.
pub fn run_tool(
    runner: &mut dyn CommandRunner,
    cmd: &ProcessBuilder,
    shell: &Shell,
) -> Result<RunResult> {
    let command = cmd.display_command();
    shell.status(Status::Running, &command);

    let result = runner.run(cmd)?;
    shell.tool_output(&result.stdout, &result.stderr);

    if !result.succeeded() {
        return Err(BuildError::ToolFailed {
            command,
            stderr: result.stderr.trim_end().to_string(),
        }
        .into());
    }
    if result.status.is_some_and(|code| code != 0) {
        tracing::warn!("`{}` exited with {:?} but printed no errors", command, result.status);
    }
    Ok(result)
}

/// Invoke the driver once per unit, in order, stopping at the first failure.
///
/// On Windows the toolchain's script directory is put on PATH first so the
/// driver recipe can find `vcvarsall.bat`.
pub fn build(
    plan: &BuildPlan,
    toolchain: &ToolchainDescriptor,
    candidates: &[SolutionCandidate],
    env: &mut BuildEnv,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> Result<()> {
    if let Some(root) = &toolchain.compiler_tool_root {
        env.prepend_path(root);
        tracing::debug!("prepended {} to PATH", root.display());
    }

    for candidate in candidates {
        shell.banner(format!("building target {}", candidate.display_name()));
        let cmd = env.apply(toolchain.driver_command(
            candidate,
            plan.build_type,
            plan.build_method,
        ));
        run_tool(runner, &cmd, shell)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::select_toolchain;
    use crate::core::{build_error, BuildTool, HostPlatform, Platform};
    use crate::test_support::fixtures::plan_for;
    use crate::test_support::{CommandPattern, MockRunner};
    use crate::util::shell::Verbosity;
    use std::path::{Path, PathBuf};

    fn shell() -> Shell {
        Shell::new(Verbosity::Normal, true)
    }

    #[test]
    fn test_linux_passes_targets_verbatim() {
        let plan = plan_for(Platform::Linux, BuildTool::Make);
        let tc = select_toolchain(&plan, &HostPlatform::linux_x64()).unwrap();
        let mut env = BuildEnv::from_vars(Platform::Linux, Vec::new(), "/work/app/build_lin");
        let mut runner = MockRunner::new();

        build(
            &plan,
            &tc,
            &[SolutionCandidate::Targets(vec!["install".into()])],
            &mut env,
            &mut runner,
            &shell(),
        )
        .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].display_command(), "make install");
        assert_eq!(calls[0].get_cwd(), Some(Path::new("/work/app/build_lin")));
    }

    #[test]
    fn test_fail_fast_skips_later_targets() {
        let plan = plan_for(Platform::Windows, BuildTool::VisualStudio);
        let tc = select_toolchain(&plan, &HostPlatform::windows_x64()).unwrap();
        let mut env = BuildEnv::from_vars(Platform::Windows, Vec::new(), "C:/work/build_win");
        let mut runner = MockRunner::new();
        runner.expect(
            CommandPattern::Contains("a.vcxproj".into()),
            RunResult::new("", "a.cpp(3): error C2065: undeclared identifier"),
        );

        let candidates = [
            SolutionCandidate::Project(PathBuf::from("C:/work/build_win/a.vcxproj")),
            SolutionCandidate::Project(PathBuf::from("C:/work/build_win/b.vcxproj")),
        ];
        let err = build(&plan, &tc, &candidates, &mut env, &mut runner, &shell()).unwrap_err();

        assert!(matches!(build_error(&err), Some(BuildError::ToolFailed { .. })));
        assert_eq!(runner.calls().len(), 1);
        assert!(runner.calls()[0].display_command().contains("a.vcxproj"));
    }

    #[test]
    fn test_tool_root_is_prepended_to_path() {
        let plan = plan_for(Platform::Windows, BuildTool::VisualStudio);
        let tc = select_toolchain(&plan, &HostPlatform::windows_x64())
            .unwrap()
            .with_tool_root(PathBuf::from("C:/VS/VC/Auxiliary/Build"));
        let mut env = BuildEnv::from_vars(
            Platform::Windows,
            [("PATH".to_string(), "C:/Windows".to_string())],
            "C:/work/build_win",
        );
        let mut runner = MockRunner::new();

        build(
            &plan,
            &tc,
            &[SolutionCandidate::Solution(PathBuf::from("C:/work/build_win/demo.sln"))],
            &mut env,
            &mut runner,
            &shell(),
        )
        .unwrap();

        assert_eq!(
            runner.calls()[0].get_env("PATH"),
            Some("C:/VS/VC/Auxiliary/Build;C:/Windows")
        );
        assert_eq!(
            runner.calls()[0].display_command(),
            "cmd /C vcvarsall.bat x64 && msbuild demo.sln -t:Rebuild -p:Configuration=Release"
        );
    }

    #[test]
    fn test_run_tool_reports_stderr() {
        let mut runner = MockRunner::new();
        runner.expect(CommandPattern::Any, RunResult::new("", "fatal: nope\n"));
        let err = run_tool(&mut runner, &ProcessBuilder::new("make"), &shell()).unwrap_err();

        match build_error(&err) {
            Some(BuildError::ToolFailed { command, stderr }) => {
                assert_eq!(command, "make");
                assert_eq!(stderr, "fatal: nope");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
