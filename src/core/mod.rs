//! Core data structures for cmbuild.
//!
//! - Raw command-line options and the resolved `BuildPlan`
//! - Host platform facts
//! - The error taxonomy shared by every stage

pub mod error;
pub mod options;
pub mod plan;
pub mod platform;

pub use error::{build_error, BuildError, ErrorKind};
pub use options::RawOptions;
pub use plan::{
    BuildMethod, BuildPlan, BuildTool, BuildType, DockerDelegation, SolutionCandidate,
};
pub use platform::{HostArch, HostOs, HostPlatform, Platform};
