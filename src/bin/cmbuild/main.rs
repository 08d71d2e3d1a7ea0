//! cmbuild CLI - configure and build CMake projects

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmbuild::ops::{run, RunContext};
use cmbuild::util::SystemRunner;

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.options.verbose {
        EnvFilter::new("cmbuild=debug")
    } else {
        EnvFilter::new("cmbuild=info")
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();
    // A delegated run keeps stderr for errors only.
    if cli.options.console_stdout {
        subscriber.with_writer(std::io::stdout).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    let ctx = match RunContext::from_process() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Failures are reported through the run log; the exit status stays 0.
    let outcome = run(&cli.options, &ctx, &mut SystemRunner);
    tracing::debug!("run finished in state {}", outcome.last_stage);
}
