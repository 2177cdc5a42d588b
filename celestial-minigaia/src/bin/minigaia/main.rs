//! minigaia: build and inspect Mini Gaia DB files
//!
//! Converts gzipped Gaia CSV files into a fixed-record binary database and
//! reads one back for inspection.

mod cli;
mod convert;
mod dump;
mod magnitudes;
mod metadata;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Convert(args) => convert::run(args, &cli),
        Commands::Metadata(args) => metadata::run(args),
        Commands::Magnitudes(args) => magnitudes::run(args),
        Commands::Dump(args) => dump::run(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
