//! Host platform facts.

use std::fmt;

use serde::Serialize;

use crate::core::error::BuildError;

/// Operating system of the host running the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Linux,
    Other(String),
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::Windows => f.write_str("windows"),
            HostOs::Linux => f.write_str("linux"),
            HostOs::Other(name) => f.write_str(name),
        }
    }
}

/// Machine architecture of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostArch {
    X86_64,
    X86,
    Aarch64,
    Other(String),
}

impl HostArch {
    fn from_consts(arch: &str) -> Self {
        match arch {
            "x86_64" => HostArch::X86_64,
            "x86" => HostArch::X86,
            "aarch64" => HostArch::Aarch64,
            other => HostArch::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HostArch::X86_64 => "x86_64",
            HostArch::X86 => "x86",
            HostArch::Aarch64 => "aarch64",
            HostArch::Other(s) => s,
        }
    }
}

impl fmt::Display for HostArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the orchestrator knows about the machine it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub os: HostOs,
    pub arch: HostArch,
}

impl HostPlatform {
    /// Detect the platform this binary was compiled for and runs on.
    pub fn detect() -> Self {
        let os = match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "linux" => HostOs::Linux,
            other => HostOs::Other(other.to_string()),
        };
        HostPlatform {
            os,
            arch: HostArch::from_consts(std::env::consts::ARCH),
        }
    }

    pub fn windows_x64() -> Self {
        HostPlatform {
            os: HostOs::Windows,
            arch: HostArch::X86_64,
        }
    }

    pub fn linux_x64() -> Self {
        HostPlatform {
            os: HostOs::Linux,
            arch: HostArch::X86_64,
        }
    }

    /// The build platform for this host, or an unsupported-OS error.
    pub fn platform(&self) -> Result<Platform, BuildError> {
        match &self.os {
            HostOs::Windows => Ok(Platform::Windows),
            HostOs::Linux => Ok(Platform::Linux),
            HostOs::Other(name) => Err(BuildError::UnsupportedOs(name.clone())),
        }
    }
}

/// Platform a build plan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    Windows,
    Linux,
}

impl Platform {
    /// Separator between entries of the PATH variable.
    pub fn path_separator(&self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::Linux => ':',
        }
    }

    /// Name of the default build directory under the source dir.
    pub fn default_build_dir_name(&self) -> &'static str {
        match self {
            Platform::Windows => "build_win",
            Platform::Linux => "build_lin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::Linux => write!(f, "Linux"),
        }
    }
}
