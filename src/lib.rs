//! cmbuild - configure and build CMake projects with the platform's native tools
//!
//! This crate provides the library behind the `cmbuild` binary: option
//! resolution, generator selection, the configure and build stages and the
//! orchestrator that runs them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test doubles for the external tools the pipeline drives.
///
/// Only compiled for unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildError, BuildPlan, HostPlatform, RawOptions};
pub use ops::{run, RunContext, RunOutcome, Stage};
