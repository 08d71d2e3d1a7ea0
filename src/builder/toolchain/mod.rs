//! Generator selection.
//!
//! Maps the platform, the requested build driver and the toolchain version
//! to a CMake generator plus the recipe for invoking the driver.

pub mod msvc;
pub mod unix;

use std::path::{Path, PathBuf};

use crate::core::{
    BuildError, BuildMethod, BuildPlan, BuildTool, BuildType, HostArch, HostPlatform, Platform,
    SolutionCandidate,
};
use crate::util::process::ProcessBuilder;

pub use msvc::{find_tool_root, recover_compiler_paths, CompilerInfo};

/// Target architecture token for the Visual Studio environment script.
const MSVC_TARGET_ARCH: &str = "x64";

/// How the build driver is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverRecipe {
    /// `vcvarsall.bat <arch> && msbuild <solution> -t:<method> -p:Configuration=<type>`
    MsBuild,
    /// `make <targets...>`
    Make,
    /// `ninja <targets...>`
    Ninja,
}

impl DriverRecipe {
    /// Whether the build type is fixed when configuring instead of when building.
    pub fn build_type_at_configure(&self) -> bool {
        !matches!(self, DriverRecipe::MsBuild)
    }
}

/// The toolchain decisions for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainDescriptor {
    pub generator_name: String,
    pub arch_param: String,
    /// Directory of the Visual Studio auxiliary scripts, known after configure.
    pub compiler_tool_root: Option<PathBuf>,
    pub recipe: DriverRecipe,
}

impl ToolchainDescriptor {
    /// A copy of this descriptor with the auxiliary script directory filled in.
    pub fn with_tool_root(&self, root: PathBuf) -> Self {
        ToolchainDescriptor {
            compiler_tool_root: Some(root),
            ..self.clone()
        }
    }

    /// `cmake -G <generator> [-DCMAKE_BUILD_TYPE=<type>] <source>`
    pub fn configure_command(&self, source_dir: &Path, build_type: BuildType) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new("cmake").arg("-G").arg(&self.generator_name);
        if self.recipe.build_type_at_configure() {
            cmd = cmd.arg(unix::build_type_definition(build_type));
        }
        cmd.arg(source_dir)
    }

    /// The driver invocation for one resolved build unit.
    pub fn driver_command(
        &self,
        candidate: &SolutionCandidate,
        build_type: BuildType,
        method: BuildMethod,
    ) -> ProcessBuilder {
        match (self.recipe, candidate) {
            (DriverRecipe::MsBuild, _) => ProcessBuilder::new("cmd").args([
                "/C".to_string(),
                "vcvarsall.bat".to_string(),
                self.arch_param.clone(),
                "&&".to_string(),
                "msbuild".to_string(),
                candidate.display_name(),
                format!("-t:{}", method.as_str()),
                format!("-p:Configuration={}", build_type.cmake_name()),
            ]),
            (DriverRecipe::Make | DriverRecipe::Ninja, candidate) => {
                let tool = if self.recipe == DriverRecipe::Ninja {
                    BuildTool::Ninja
                } else {
                    BuildTool::Make
                };
                let cmd = ProcessBuilder::new(unix::driver_program(tool));
                match candidate {
                    SolutionCandidate::Targets(targets) => cmd.args(targets),
                    other => cmd.arg(other.display_name()),
                }
            }
        }
    }
}

/// Pick the generator and driver recipe for a plan.
///
/// Unsupported combinations fail without touching anything.
pub fn select_toolchain(
    plan: &BuildPlan,
    host: &HostPlatform,
) -> Result<ToolchainDescriptor, BuildError> {
    let unsupported = || BuildError::UnsupportedBuildTool {
        tool: plan.build_tool.to_string(),
        platform: plan.platform.to_string(),
    };

    match (plan.platform, plan.build_tool) {
        (Platform::Windows, BuildTool::VisualStudio) => {
            if host.arch != HostArch::X86_64 {
                return Err(BuildError::UnsupportedHostArch(host.arch.to_string()));
            }
            Ok(ToolchainDescriptor {
                generator_name: msvc::generator_for_version(&plan.msvc_version)?,
                arch_param: MSVC_TARGET_ARCH.to_string(),
                compiler_tool_root: None,
                recipe: DriverRecipe::MsBuild,
            })
        }
        // Ninja and NMake need cl.exe on PATH before configure; only the MSBuild recipe sets it up.
        (Platform::Windows, _) => Err(unsupported()),
        (Platform::Linux, tool @ (BuildTool::Make | BuildTool::Ninja)) => {
            let generator = unix::generator_for(tool).ok_or_else(unsupported)?;
            Ok(ToolchainDescriptor {
                generator_name: generator.to_string(),
                arch_param: host.arch.to_string(),
                compiler_tool_root: None,
                recipe: if tool == BuildTool::Ninja {
                    DriverRecipe::Ninja
                } else {
                    DriverRecipe::Make
                },
            })
        }
        (Platform::Linux, _) => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::plan_for;

    #[test]
    fn test_linux_make() {
        let plan = plan_for(Platform::Linux, BuildTool::Make);
        let tc = select_toolchain(&plan, &HostPlatform::linux_x64()).unwrap();
        assert_eq!(tc.generator_name, "Unix Makefiles");
        assert_eq!(tc.recipe, DriverRecipe::Make);

        let cmd = tc.configure_command(Path::new("/work/app"), BuildType::Release);
        assert_eq!(
            cmd.display_command(),
            "cmake -G \"Unix Makefiles\" -DCMAKE_BUILD_TYPE=Release /work/app"
        );
    }

    #[test]
    fn test_linux_ninja_driver() {
        let plan = plan_for(Platform::Linux, BuildTool::Ninja);
        let tc = select_toolchain(&plan, &HostPlatform::linux_x64()).unwrap();
        assert_eq!(tc.generator_name, "Ninja");

        let cmd = tc.driver_command(
            &SolutionCandidate::Targets(vec!["all".into(), "install".into()]),
            BuildType::Debug,
            BuildMethod::Rebuild,
        );
        assert_eq!(cmd.display_command(), "ninja all install");
    }

    #[test]
    fn test_windows_visual_studio() {
        let mut plan = plan_for(Platform::Windows, BuildTool::VisualStudio);
        plan.msvc_version = "2017".into();
        let tc = select_toolchain(&plan, &HostPlatform::windows_x64()).unwrap();
        assert_eq!(tc.generator_name, "Visual Studio 15 2017 Win64");
        assert_eq!(tc.arch_param, "x64");

        let cmd = tc.configure_command(Path::new("C:/work/app"), BuildType::Debug);
        assert_eq!(
            cmd.display_command(),
            "cmake -G \"Visual Studio 15 2017 Win64\" C:/work/app"
        );

        let cmd = tc.driver_command(
            &SolutionCandidate::Solution(PathBuf::from("C:/work/app/build_win/app.sln")),
            BuildType::Debug,
            BuildMethod::Rebuild,
        );
        assert_eq!(
            cmd.display_command(),
            "cmd /C vcvarsall.bat x64 && msbuild app.sln -t:Rebuild -p:Configuration=Debug"
        );
    }

    #[test]
    fn test_windows_rejects_32_bit_host() {
        let plan = plan_for(Platform::Windows, BuildTool::VisualStudio);
        let host = HostPlatform {
            os: crate::core::HostOs::Windows,
            arch: HostArch::X86,
        };
        assert!(matches!(
            select_toolchain(&plan, &host),
            Err(BuildError::UnsupportedHostArch(a)) if a == "x86"
        ));
    }

    #[test]
    fn test_unsupported_combinations() {
        let cases = [
            (Platform::Windows, BuildTool::Ninja),
            (Platform::Windows, BuildTool::NMake),
            (Platform::Windows, BuildTool::Make),
            (Platform::Linux, BuildTool::VisualStudio),
            (Platform::Linux, BuildTool::NMake),
        ];
        for (platform, tool) in cases {
            let plan = plan_for(platform, tool);
            let host = match platform {
                Platform::Windows => HostPlatform::windows_x64(),
                Platform::Linux => HostPlatform::linux_x64(),
            };
            assert!(
                matches!(
                    select_toolchain(&plan, &host),
                    Err(BuildError::UnsupportedBuildTool { .. })
                ),
                "{:?} on {:?} should be unsupported",
                tool,
                platform
            );
        }
    }

    #[test]
    fn test_selection_is_deterministic() {
        let plan = plan_for(Platform::Windows, BuildTool::VisualStudio);
        let host = HostPlatform::windows_x64();
        assert_eq!(
            select_toolchain(&plan, &host).unwrap(),
            select_toolchain(&plan, &host).unwrap()
        );
    }

    #[test]
    fn test_with_tool_root_leaves_original_untouched() {
        let plan = plan_for(Platform::Windows, BuildTool::VisualStudio);
        let tc = select_toolchain(&plan, &HostPlatform::windows_x64()).unwrap();
        let rooted = tc.with_tool_root(PathBuf::from("C:/VS/VC/Auxiliary/Build"));
        assert!(tc.compiler_tool_root.is_none());
        assert_eq!(
            rooted.compiler_tool_root,
            Some(PathBuf::from("C:/VS/VC/Auxiliary/Build"))
        );
    }
}
