//! High-level operations.
//!
//! Option resolution, container delegation, host probing and the
//! orchestrator that sequences them with the configure and build stages.

pub mod docker;
pub mod doctor;
pub mod pipeline;
pub mod resolve;

pub use docker::{delegate, delegation_args, docker_command};
pub use doctor::{probe, ProbeReport, ToolCheck};
pub use pipeline::{run, RunContext, RunOutcome, Stage};
pub use resolve::{resolve_plan, ConfigSummary};
