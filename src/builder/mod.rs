//! Configure and build stages.
//!
//! This module selects the CMake generator, runs the configure step,
//! resolves the units to build and drives the native build tool.

pub mod cmake;
pub mod context;
pub mod executor;
pub mod solution;
pub mod toolchain;

pub use cmake::{configure, ConfigureReport};
pub use context::BuildEnv;
pub use executor::{build, run_tool};
pub use solution::resolve_targets;
pub use toolchain::{select_toolchain, CompilerInfo, DriverRecipe, ToolchainDescriptor};
