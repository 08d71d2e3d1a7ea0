//! Error taxonomy for a build run.
//!
//! Every variant is fatal to the current run. Stages raise these through
//! `anyhow`, so callers that need the category use `downcast_ref`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Broad category of a [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Contradictory or unsupported user input, caught before any side effect.
    Configuration,
    /// Expected facts missing from the configure tool's output.
    ToolchainDiscovery,
    /// Ambiguous or missing build artifact.
    Resolution,
    /// An external tool reported diagnostics on stderr.
    Execution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration error"),
            ErrorKind::ToolchainDiscovery => write!(f, "toolchain discovery error"),
            ErrorKind::Resolution => write!(f, "resolution error"),
            ErrorKind::Execution => write!(f, "execution error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build type options are mutually exclusive: {}", .flags.join(", "))]
    ConflictingBuildTypes { flags: Vec<String> },

    #[error("unknown build type `{0}`")]
    InvalidBuildType(String),

    #[error("host operating system `{0}` is not supported")]
    UnsupportedOs(String),

    #[error("host architecture `{0}` is not supported")]
    UnsupportedHostArch(String),

    #[error("build tool `{tool}` is not supported on {platform}")]
    UnsupportedBuildTool { tool: String, platform: String },

    #[error("Visual Studio `{0}` is not supported")]
    UnsupportedMsvcVersion(String),

    #[error("container delegation requested but no image was given")]
    MissingDockerImage,

    #[error("{lang} compiler not found in configure output")]
    CompilerNotFound { lang: &'static str },

    #[error("C compiler ({c}) and CXX compiler ({cxx}) are not in the same directory")]
    CompilerDirMismatch { c: PathBuf, cxx: PathBuf },

    #[error(
        "`Tools` directory not found above {}, Visual Studio installation layout may have changed",
        .compiler_dir.display()
    )]
    ToolsDirNotFound { compiler_dir: PathBuf },

    #[error("solution file not found in {}", .build_dir.display())]
    SolutionNotFound { build_dir: PathBuf },

    #[error("multiple solution files found and no target selects one: {}", .candidates.join(", "))]
    AmbiguousSolution { candidates: Vec<String> },

    #[error("target `{target}` not found in build dir {}", .build_dir.display())]
    TargetNotFound { target: String, build_dir: PathBuf },

    #[error("`{command}` reported errors:\n{stderr}")]
    ToolFailed { command: String, stderr: String },
}

impl BuildError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::ConflictingBuildTypes { .. }
            | BuildError::InvalidBuildType(_)
            | BuildError::UnsupportedOs(_)
            | BuildError::UnsupportedHostArch(_)
            | BuildError::UnsupportedBuildTool { .. }
            | BuildError::UnsupportedMsvcVersion(_)
            | BuildError::MissingDockerImage => ErrorKind::Configuration,

            BuildError::CompilerNotFound { .. }
            | BuildError::CompilerDirMismatch { .. }
            | BuildError::ToolsDirNotFound { .. } => ErrorKind::ToolchainDiscovery,

            BuildError::SolutionNotFound { .. }
            | BuildError::AmbiguousSolution { .. }
            | BuildError::TargetNotFound { .. } => ErrorKind::Resolution,

            BuildError::ToolFailed { .. } => ErrorKind::Execution,
        }
    }
}

/// Find the [`BuildError`] in an error chain, if there is one.
pub fn build_error(err: &anyhow::Error) -> Option<&BuildError> {
    err.chain().find_map(|e| e.downcast_ref::<BuildError>())
}
