//! Option resolution: turns raw options, config files and host facts into a
//! `BuildPlan`.
//!
//! Resolution is pure. It reads nothing but its arguments, so a rejected
//! option set never creates a directory or spawns a process.

use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::builder::toolchain::ToolchainDescriptor;
use crate::core::{
    BuildError, BuildMethod, BuildPlan, BuildTool, BuildType, DockerDelegation, HostPlatform,
    Platform, RawOptions, SolutionCandidate,
};
use crate::util::config::Config;
use crate::util::fs::absolutize;

/// Visual Studio version used when none is requested.
pub const DEFAULT_MSVC_VERSION: &str = "2019";

/// Mount point of the source tree inside the container.
pub const DEFAULT_DOCKER_MOUNT: &str = "/src";

/// Program re-invoked inside the container.
pub const DEFAULT_DOCKER_PROGRAM: &str = "cmbuild";

/// Resolve the plan for one run.
///
/// Precedence is command line, then config files, then platform defaults.
pub fn resolve_plan(
    options: &RawOptions,
    host: &HostPlatform,
    config: &Config,
    cwd: &Path,
) -> Result<BuildPlan, BuildError> {
    let build_type = resolve_build_type(options, config)?;
    let platform = host.platform()?;
    let build_tool = resolve_build_tool(options, config, platform)?;

    let source_dir = absolutize(options.source_dir.as_deref().unwrap_or(cwd), cwd);
    let build_dir = options
        .build_dir
        .clone()
        .or_else(|| config.build.build_dir.clone())
        .unwrap_or_else(|| PathBuf::from(platform.default_build_dir_name()));
    let build_dir = absolutize(&build_dir, &source_dir);

    let msvc_version = options
        .msvc_version
        .clone()
        .or_else(|| config.build.msvc_version.clone())
        .unwrap_or_else(|| DEFAULT_MSVC_VERSION.to_string());

    let incremental = switch(options.incremental, options.rebuild, config.build.incremental);

    Ok(BuildPlan {
        build_type,
        platform,
        build_tool,
        msvc_version,
        source_dir,
        build_dir,
        targets: options.targets.clone(),
        clean_before: switch(
            options.clean_before,
            options.no_clean_before,
            config.build.clean_before,
        ),
        clean_after: switch(options.clean_after, options.no_clean_after, config.build.clean_after),
        build_method: if incremental {
            BuildMethod::Build
        } else {
            BuildMethod::Rebuild
        },
        verbose: options.verbose,
        log_file: !options.no_log_file,
        no_color: options.no_color,
        print_plan: options.print_plan,
        docker: resolve_docker(options, config)?,
    })
}

/// A command-line switch and its negation beat the config value.
fn switch(on: bool, off: bool, config: Option<bool>) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        config.unwrap_or(false)
    }
}

/// At most one build-type selector may be given on the command line.
fn resolve_build_type(options: &RawOptions, config: &Config) -> Result<BuildType, BuildError> {
    let explicit = options
        .build_type
        .as_deref()
        .map(str::parse::<BuildType>)
        .transpose()?;

    let mut requested: Vec<(String, BuildType)> = Vec::new();
    if options.debug {
        requested.push(("--debug".into(), BuildType::Debug));
    }
    if options.relwithdebinfo {
        requested.push(("--relwithdebinfo".into(), BuildType::RelWithDebInfo));
    }
    if options.relminsize {
        requested.push(("--relminsize".into(), BuildType::RelMinSize));
    }
    if let Some(bt) = explicit.filter(|bt| *bt != BuildType::default()) {
        requested.push((format!("--build-type {}", bt), bt));
    }

    match requested.as_slice() {
        [] => match (explicit, &config.build.build_type) {
            (Some(bt), _) => Ok(bt),
            (None, Some(name)) => name.parse(),
            (None, None) => Ok(BuildType::default()),
        },
        [(_, bt)] => Ok(*bt),
        many => Err(BuildError::ConflictingBuildTypes {
            flags: many.iter().map(|(flag, _)| flag.clone()).collect(),
        }),
    }
}

fn resolve_build_tool(
    options: &RawOptions,
    config: &Config,
    platform: Platform,
) -> Result<BuildTool, BuildError> {
    match options
        .build_tool
        .as_deref()
        .or(config.build.build_tool.as_deref())
    {
        Some(name) => name
            .parse()
            .map_err(|tool| BuildError::UnsupportedBuildTool {
                tool,
                platform: platform.to_string(),
            }),
        None => Ok(BuildTool::default_for(platform)),
    }
}

fn resolve_docker(
    options: &RawOptions,
    config: &Config,
) -> Result<Option<DockerDelegation>, BuildError> {
    if !options.docker {
        return Ok(None);
    }

    let image = options
        .docker_image
        .clone()
        .or_else(|| config.docker.image.clone())
        .ok_or(BuildError::MissingDockerImage)?;

    Ok(Some(DockerDelegation {
        image,
        mount: options
            .docker_mount
            .clone()
            .or_else(|| config.docker.mount.clone())
            .unwrap_or_else(|| DEFAULT_DOCKER_MOUNT.to_string()),
        program: config
            .docker
            .program
            .clone()
            .unwrap_or_else(|| DEFAULT_DOCKER_PROGRAM.to_string()),
    }))
}

/// Fixed, ordered dump of the resolved configuration.
///
/// Commands appear already rendered. Run-scoped handles such as the log
/// file and the environment are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    entries: Vec<(&'static str, String)>,
}

impl ConfigSummary {
    pub fn new(plan: &BuildPlan, toolchain: Option<&ToolchainDescriptor>) -> Self {
        let mut entries = vec![
            ("platform", plan.platform.to_string()),
            ("build_type", plan.build_type.to_string()),
            ("build_tool", plan.build_tool.to_string()),
        ];
        if plan.platform == Platform::Windows {
            entries.push(("msvc_version", plan.msvc_version.clone()));
        }
        entries.extend([
            ("source_dir", plan.source_dir.display().to_string()),
            ("build_dir", plan.build_dir.display().to_string()),
            ("targets", plan.targets.join(" ")),
            ("clean_before", plan.clean_before.to_string()),
            ("clean_after", plan.clean_after.to_string()),
            ("build_method", plan.build_method.as_str().to_string()),
            ("log_file", plan.log_file.to_string()),
        ]);

        if let Some(docker) = &plan.docker {
            entries.push(("docker_image", docker.image.clone()));
            entries.push(("docker_mount", docker.mount.clone()));
        }

        if let Some(tc) = toolchain {
            let placeholder = match plan.platform {
                Platform::Windows => SolutionCandidate::Solution(PathBuf::from("<solution>")),
                Platform::Linux => SolutionCandidate::Targets(plan.targets.clone()),
            };
            entries.extend([
                ("generator", tc.generator_name.clone()),
                ("arch", tc.arch_param.clone()),
                (
                    "configure_command",
                    tc.configure_command(&plan.source_dir, plan.build_type)
                        .display_command(),
                ),
                (
                    "driver_command",
                    tc.driver_command(&placeholder, plan.build_type, plan.build_method)
                        .display_command(),
                ),
            ]);
        }

        ConfigSummary { entries }
    }

    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `  name : value` lines for the run log.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| format!("  {} : {}", name, value))
    }
}

impl Serialize for ConfigSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
