//! gff-inspect binary entry point.
//!
//! Thin wrapper around the aurora-gff-inspect library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Prints the rendered file

use anyhow::Result;
use aurora_gff_inspect::{InspectConfig, run};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = InspectConfig::from_args();

    // --log-level wins over RUST_LOG; warnings only by default
    let filter = match &config.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(file = %config.file.display(), format = ?config.format, "inspecting");

    print!("{}", run(&config)?);
    Ok(())
}
