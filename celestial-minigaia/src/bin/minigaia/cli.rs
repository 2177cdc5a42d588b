//! CLI argument definitions for minigaia

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "minigaia")]
#[command(about = "Compact binary databases from Gaia catalog CSV files")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a directory of gzipped CSV files into a database
    Convert(ConvertArgs),

    /// Print the header of a database
    Metadata(MetadataArgs),

    /// Histogram of a magnitude column by integer magnitude
    Magnitudes(MagnitudesArgs),

    /// Print records as space-separated values
    Dump(DumpArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Directory containing gzipped Gaia CSV files
    #[arg(long)]
    pub path: PathBuf,

    /// Output database file
    #[arg(long)]
    pub output: PathBuf,

    /// Columns to store, in record order
    #[arg(long, num_args = 1..)]
    pub columns: Vec<String>,

    /// TOML file with `columns` and conversion options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail instead of truncating header fields longer than 255 bytes
    #[arg(long)]
    pub strict_header: bool,

    /// Store empty or null numeric fields as NaN/0/false instead of failing
    #[arg(long)]
    pub fill_missing: bool,
}

#[derive(Parser)]
pub struct MetadataArgs {
    /// Database file
    #[arg(long)]
    pub database: PathBuf,
}

#[derive(Parser)]
pub struct MagnitudesArgs {
    /// Database file
    #[arg(long)]
    pub database: PathBuf,

    /// Numeric column to bin
    #[arg(long, default_value = "phot_g_mean_mag")]
    pub column: String,
}

#[derive(Parser)]
pub struct DumpArgs {
    /// Database file
    #[arg(long)]
    pub database: PathBuf,

    /// Print only the first N records
    #[arg(long)]
    pub limit: Option<usize>,
}
