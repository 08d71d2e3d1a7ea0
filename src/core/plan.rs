//! The resolved build plan.
//!
//! A `BuildPlan` is produced once by the config resolver and only read
//! afterwards.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::BuildError;
use crate::core::platform::Platform;

/// Optimization/debug-info profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BuildType {
    #[default]
    Release,
    Debug,
    RelWithDebInfo,
    RelMinSize,
}

impl BuildType {
    /// Configuration name understood by CMake and MSBuild.
    pub fn cmake_name(&self) -> &'static str {
        match self {
            BuildType::Release => "Release",
            BuildType::Debug => "Debug",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::RelMinSize => "MinSizeRel",
        }
    }

    /// The command-line flag selecting this build type, if it has one.
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            BuildType::Release => None,
            BuildType::Debug => Some("--debug"),
            BuildType::RelWithDebInfo => Some("--relwithdebinfo"),
            BuildType::RelMinSize => Some("--relminsize"),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildType::Release => "Release",
            BuildType::Debug => "Debug",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::RelMinSize => "RelMinSize",
        };
        f.write_str(s)
    }
}

impl FromStr for BuildType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(BuildType::Release),
            "debug" => Ok(BuildType::Debug),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "relminsize" | "minsizerel" => Ok(BuildType::RelMinSize),
            _ => Err(BuildError::InvalidBuildType(s.to_string())),
        }
    }
}

/// Platform-native build driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildTool {
    VisualStudio,
    Make,
    Ninja,
    NMake,
}

impl BuildTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTool::VisualStudio => "Visual Studio",
            BuildTool::Make => "make",
            BuildTool::Ninja => "ninja",
            BuildTool::NMake => "nmake",
        }
    }

    /// Driver used when the user does not pick one.
    pub fn default_for(platform: Platform) -> Self {
        match platform {
            Platform::Windows => BuildTool::VisualStudio,
            Platform::Linux => BuildTool::Make,
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visual studio" | "visual-studio" | "vs" | "msbuild" => Ok(BuildTool::VisualStudio),
            "make" => Ok(BuildTool::Make),
            "ninja" => Ok(BuildTool::Ninja),
            "nmake" => Ok(BuildTool::NMake),
            _ => Err(s.to_string()),
        }
    }
}

/// Full rebuild or incremental build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BuildMethod {
    #[default]
    Rebuild,
    Build,
}

impl BuildMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMethod::Rebuild => "Rebuild",
            BuildMethod::Build => "Build",
        }
    }
}

/// Settings for re-running the pipeline inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DockerDelegation {
    pub image: String,
    /// Where the source directory is mounted in the container.
    pub mount: String,
    /// Program invoked inside the container.
    pub program: String,
}

/// Every decision needed to configure and build one source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub build_type: BuildType,
    pub platform: Platform,
    pub build_tool: BuildTool,
    pub msvc_version: String,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    /// Explicit targets; empty means the default target.
    pub targets: Vec<String>,
    pub clean_before: bool,
    /// Only honored after a successful build.
    pub clean_after: bool,
    pub build_method: BuildMethod,
    pub verbose: bool,
    pub log_file: bool,
    pub no_color: bool,
    pub print_plan: bool,
    pub docker: Option<DockerDelegation>,
}

/// A concrete unit handed to the build driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionCandidate {
    /// The ambient solution of the build tree.
    Solution(PathBuf),
    /// A per-target project file.
    Project(PathBuf),
    /// Target names the driver interprets itself (Make, Ninja).
    Targets(Vec<String>),
}

impl SolutionCandidate {
    /// Human-readable name for log banners.
    pub fn display_name(&self) -> String {
        match self {
            SolutionCandidate::Solution(p) | SolutionCandidate::Project(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            SolutionCandidate::Targets(t) if t.is_empty() => "default".to_string(),
            SolutionCandidate::Targets(t) => t.join(" "),
        }
    }
}
