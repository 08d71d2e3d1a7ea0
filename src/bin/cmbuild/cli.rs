//! CLI definition using clap.

use clap::Parser;

use cmbuild::RawOptions;

/// cmbuild - configure and build a CMake project with the native build tool
#[derive(Parser)]
#[command(name = "cmbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: RawOptions,
}
