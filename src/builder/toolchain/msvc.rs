//! Visual Studio toolchain support.
//!
//! Maps version tokens to CMake generators and recovers the compiler
//! location from CMake's configure output.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::BuildError;

/// Generator suffix selecting a 64-bit target on pre-2019 generators.
const WIN64_SUFFIX: &str = " Win64";

/// Name of the directory the auxiliary build scripts hang off.
const TOOLS_ANCHOR: &str = "Tools";

/// Map a Visual Studio year or internal version number to its CMake generator.
pub fn generator_for_version(token: &str) -> Result<String, BuildError> {
    let base = match token.trim() {
        "2019" | "16" => return Ok("Visual Studio 16 2019".to_string()),
        "2017" | "15" => "Visual Studio 15 2017",
        "2015" | "14" => "Visual Studio 14 2015",
        "2013" | "12" => "Visual Studio 12 2013",
        "2012" | "11" => "Visual Studio 11 2012",
        other => return Err(BuildError::UnsupportedMsvcVersion(other.to_string())),
    };
    Ok(format!("{}{}", base, WIN64_SUFFIX))
}

/// Compiler locations reported by the configure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInfo {
    pub c_compiler_path: PathBuf,
    pub cxx_compiler_path: PathBuf,
}

// CMake prints either
//   -- Check for working C compiler: C:/.../cl.exe
//   -- Check for working C compiler: C:/.../cl.exe -- works
//   -- Check for working C compiler: C:/.../cl.exe - skipped
static C_COMPILER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(
        r"(?m)Check for working C compiler: (.+?)(?:\s+-{1,2}\s+(?:works|skipped|broken))?[ \t]*$",
    )
    .unwrap()]
});

static CXX_COMPILER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(
        r"(?m)Check for working CXX compiler: (.+?)(?:\s+-{1,2}\s+(?:works|skipped|broken))?[ \t]*$",
    )
    .unwrap()]
});

fn first_match(patterns: &[Regex], text: &str) -> Option<PathBuf> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| PathBuf::from(m.as_str().trim().replace('\\', "/")))
    })
}

/// Recover the C and C++ compiler paths from configure output.
///
/// Both compilers must live in the same directory; anything else points
/// at a half-initialized toolchain.
pub fn recover_compiler_paths(configure_output: &str) -> Result<CompilerInfo, BuildError> {
    let c = first_match(&C_COMPILER_PATTERNS, configure_output)
        .ok_or(BuildError::CompilerNotFound { lang: "C" })?;
    let cxx = first_match(&CXX_COMPILER_PATTERNS, configure_output)
        .ok_or(BuildError::CompilerNotFound { lang: "CXX" })?;

    if c.parent() != cxx.parent() {
        return Err(BuildError::CompilerDirMismatch { c, cxx });
    }

    Ok(CompilerInfo {
        c_compiler_path: c,
        cxx_compiler_path: cxx,
    })
}

/// Locate the directory holding `vcvarsall.bat` for a discovered compiler.
///
/// Walks up from the compiler to the nearest `Tools` directory; the scripts
/// live in `Auxiliary/Build` next to it.
pub fn find_tool_root(compiler: &Path) -> Result<PathBuf, BuildError> {
    let anchor = compiler
        .ancestors()
        .skip(1)
        .find(|dir| dir.file_name().is_some_and(|name| name == TOOLS_ANCHOR));

    match anchor.and_then(Path::parent) {
        Some(vc_dir) => Ok(vc_dir.join("Auxiliary").join("Build")),
        None => Err(BuildError::ToolsDirNotFound {
            compiler_dir: compiler.parent().unwrap_or(compiler).to_path_buf(),
        }),
    }
}
