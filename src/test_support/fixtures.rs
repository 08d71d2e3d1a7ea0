//! Canned plans and tool output for unit tests.

use std::path::{Path, PathBuf};

use crate::core::{BuildMethod, BuildPlan, BuildTool, BuildType, Platform};

/// Compiler path as CMake reports it for a Visual Studio 2019 install.
pub const MSVC_CL_PATH: &str = "C:/Program Files (x86)/Microsoft Visual Studio/2019/Community/VC/Tools/MSVC/14.29.30133/bin/Hostx64/x64/cl.exe";

/// Configure output of a Visual Studio 2019 generator run.
pub const MSVC_CONFIGURE_LOG: &str = "\
-- Selecting Windows SDK version 10.0.19041.0 to target Windows 10.0.19045.
-- The C compiler identification is MSVC 19.29.30148.0
-- The CXX compiler identification is MSVC 19.29.30148.0
-- Detecting C compiler ABI info
-- Detecting C compiler ABI info - done
-- Check for working C compiler: C:/Program Files (x86)/Microsoft Visual Studio/2019/Community/VC/Tools/MSVC/14.29.30133/bin/Hostx64/x64/cl.exe - skipped
-- Detecting C compile features
-- Detecting C compile features - done
-- Detecting CXX compiler ABI info
-- Detecting CXX compiler ABI info - done
-- Check for working CXX compiler: C:/Program Files (x86)/Microsoft Visual Studio/2019/Community/VC/Tools/MSVC/14.29.30133/bin/Hostx64/x64/cl.exe - skipped
-- Detecting CXX compile features
-- Detecting CXX compile features - done
-- PROJECT_NAME = demo
-- Configuring done
-- Generating done
-- Build files have been written to: C:/work/app/build_win
";

/// A plan with every option at its default, rooted at a fixed fake path.
pub fn plan_for(platform: Platform, tool: BuildTool) -> BuildPlan {
    let source_dir = match platform {
        Platform::Windows => PathBuf::from("C:/work/app"),
        Platform::Linux => PathBuf::from("/work/app"),
    };
    plan_in(&source_dir, platform, tool)
}

/// A default plan whose source directory is `dir`.
pub fn plan_in(dir: &Path, platform: Platform, tool: BuildTool) -> BuildPlan {
    BuildPlan {
        build_type: BuildType::Release,
        platform,
        build_tool: tool,
        msvc_version: "2019".to_string(),
        source_dir: dir.to_path_buf(),
        build_dir: dir.join(platform.default_build_dir_name()),
        targets: Vec::new(),
        clean_before: false,
        clean_after: false,
        build_method: BuildMethod::Rebuild,
        verbose: false,
        log_file: false,
        no_color: true,
        print_plan: false,
        docker: None,
    }
}
