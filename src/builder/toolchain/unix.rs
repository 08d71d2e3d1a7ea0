//! Make and Ninja toolchains.
//!
//! The generated build tree is specific to one build type, so the type is
//! fixed at configure time with `CMAKE_BUILD_TYPE`.

use crate::core::{BuildTool, BuildType};

/// CMake generator for a single-configuration driver.
pub fn generator_for(tool: BuildTool) -> Option<&'static str> {
    match tool {
        BuildTool::Make => Some("Unix Makefiles"),
        BuildTool::Ninja => Some("Ninja"),
        BuildTool::VisualStudio | BuildTool::NMake => None,
    }
}

/// Driver program name.
pub fn driver_program(tool: BuildTool) -> &'static str {
    match tool {
        BuildTool::Ninja => "ninja",
        _ => "make",
    }
}

/// The `-D` definition that fixes the build type of the generated tree.
pub fn build_type_definition(build_type: BuildType) -> String {
    format!("-DCMAKE_BUILD_TYPE={}", build_type.cmake_name())
}
