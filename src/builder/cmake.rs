//! CMake configure stage.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::context::BuildEnv;
use crate::builder::executor::run_tool;
use crate::builder::toolchain::{find_tool_root, recover_compiler_paths, CompilerInfo, ToolchainDescriptor};
use crate::core::{BuildPlan, Platform};
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists, remove_file_if_exists};
use crate::util::process::CommandRunner;
use crate::util::shell::{Shell, Status};

/// Cached configuration CMake would otherwise reuse, ignoring a changed generator.
pub const CMAKE_CACHE_FILE: &str = "CMakeCache.txt";

/// What the configure step found out.
#[derive(Debug, Clone, Default)]
pub struct ConfigureReport {
    /// Raw configure output, kept for the target resolver.
    pub stdout: String,
    /// Compilers named in the output (Windows only).
    pub compilers: Option<CompilerInfo>,
    /// Directory of the Visual Studio environment scripts (Windows only).
    pub tool_root: Option<PathBuf>,
}

/// Prepare the build directory and run CMake in it.
///
/// Moves the environment's working directory into the build directory.
pub fn configure(
    plan: &BuildPlan,
    toolchain: &ToolchainDescriptor,
    env: &mut BuildEnv,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> Result<ConfigureReport> {
    if plan.clean_before && remove_dir_all_if_exists(&plan.build_dir)? {
        shell.status(Status::Removed, plan.build_dir.display());
    }
    ensure_dir(&plan.build_dir)?;
    env.set_working_dir(&plan.build_dir);

    let cache = plan.build_dir.join(CMAKE_CACHE_FILE);
    if remove_file_if_exists(&cache)? {
        shell.status(Status::Removed, cache.display());
    }

    shell.banner("running cmake");
    let cmd = env.apply(toolchain.configure_command(&plan.source_dir, plan.build_type));
    let result = run_tool(runner, &cmd, shell)?;

    let mut report = ConfigureReport {
        stdout: result.stdout,
        ..ConfigureReport::default()
    };

    if plan.platform == Platform::Windows {
        let compilers = recover_compiler_paths(&report.stdout)?;
        shell.status(
            Status::Located,
            format!("C compiler : {}", compilers.c_compiler_path.display()),
        );
        shell.status(
            Status::Located,
            format!("CXX compiler : {}", compilers.cxx_compiler_path.display()),
        );

        let tool_root = find_tool_root(&compilers.cxx_compiler_path)?;
        shell.status(
            Status::Located,
            format!("Auxiliary tool path : {}", tool_root.display()),
        );

        report.compilers = Some(compilers);
        report.tool_root = Some(tool_root);
    }

    Ok(report)
}
