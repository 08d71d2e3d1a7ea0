//! Container delegation.
//!
//! The resolved plan is turned back into an argument list once, here, and
//! handed to the same program inside the container. The delegated run parses
//! it with the same `RawOptions` definition, so whatever is serialized here
//! round-trips.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildEnv;
use crate::builder::executor::run_tool;
use crate::core::{BuildMethod, BuildPlan, BuildTool, DockerDelegation};
use crate::util::fs::normalize_separators;
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::shell::Shell;

/// Container runtime executable.
pub const DOCKER_PROGRAM: &str = "docker";

/// Arguments for the in-container run.
///
/// The container flags themselves are never included, so the delegated run
/// cannot delegate again. Paths are rewritten to their in-container
/// locations. The MSVC version is dropped and only Linux build tools are
/// carried over. Switches are always spelled out so a config file inside the
/// mounted tree cannot change them.
///
/// `--console-stdout` is always set: the delegated run then writes only
/// errors to stderr, which is what [`delegate`] judges the container by.
pub fn delegation_args(plan: &BuildPlan, docker: &DockerDelegation) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    match plan.build_type.flag() {
        Some(flag) => args.push(flag.into()),
        None => {
            args.push("--build-type".into());
            args.push(plan.build_type.to_string());
        }
    }
    if plan.verbose {
        args.push("--verbose".into());
    }
    if !plan.log_file {
        args.push("--no-log-file".into());
    }
    if plan.no_color {
        args.push("--no-color".into());
    }
    args.push("--console-stdout".into());
    args.push(switch(plan.clean_before, "--clean-before", "--no-clean-before"));
    args.push(switch(plan.clean_after, "--clean-after", "--no-clean-after"));
    args.push(switch(
        plan.build_method == BuildMethod::Build,
        "--incremental",
        "--rebuild",
    ));
    if matches!(plan.build_tool, BuildTool::Make | BuildTool::Ninja) {
        args.push("--build-tool".into());
        args.push(plan.build_tool.as_str().into());
    }

    args.push("--source-dir".into());
    args.push(docker.mount.clone());
    args.push("--build-dir".into());
    args.push(container_build_dir(plan, &docker.mount));

    if !plan.targets.is_empty() {
        args.push("--".into());
        args.extend(plan.targets.iter().cloned());
    }
    args
}

fn switch(on: bool, yes: &str, no: &str) -> String {
    let flag = if on { yes } else { no };
    flag.to_string()
}

/// Where the build directory lands once the source tree is mounted.
fn container_build_dir(plan: &BuildPlan, mount: &str) -> String {
    let mount = mount.trim_end_matches('/');
    let relative = match plan.build_dir.strip_prefix(&plan.source_dir) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => plan
            .build_dir
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default(),
    };
    let relative = path_to_slashes(&relative);
    if relative.is_empty() {
        mount.to_string()
    } else {
        format!("{}/{}", mount, relative)
    }
}

fn path_to_slashes(path: &Path) -> String {
    normalize_separators(path).display().to_string()
}

/// `docker run --rm --quiet -v <src>:<mount> -w <mount> <image> sh -c "<program> <args>"`
///
/// `--quiet` keeps image pull progress off stderr.
pub fn docker_command(plan: &BuildPlan, docker: &DockerDelegation) -> ProcessBuilder {
    let mut script = docker.program.clone();
    for arg in delegation_args(plan, docker) {
        script.push(' ');
        script.push_str(&shell_quote(&arg));
    }

    ProcessBuilder::new(DOCKER_PROGRAM).args([
        "run".to_string(),
        "--rm".to_string(),
        "--quiet".to_string(),
        "-v".to_string(),
        format!("{}:{}", path_to_slashes(&plan.source_dir), docker.mount),
        "-w".to_string(),
        docker.mount.clone(),
        docker.image.clone(),
        "sh".to_string(),
        "-c".to_string(),
        script,
    ])
}

/// Quote one word for `sh -c`.
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Run the whole pipeline inside the container.
///
/// The container counts as failed when anything reaches stderr: either the
/// runtime itself complained or the delegated run reported an error.
pub fn delegate(
    plan: &BuildPlan,
    docker: &DockerDelegation,
    env: &BuildEnv,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> Result<()> {
    shell.banner(format!("delegating to container {}", docker.image));
    let cmd = env.apply(docker_command(plan, docker));
    run_tool(runner, &cmd, shell)?;
    Ok(())
}
