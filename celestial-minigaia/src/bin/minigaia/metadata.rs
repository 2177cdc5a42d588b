//! Database header summary

use crate::cli::MetadataArgs;
use anyhow::Context;
use celestial_minigaia::MiniGaiaDb;

pub fn run(args: &MetadataArgs) -> anyhow::Result<()> {
    let db = MiniGaiaDb::open(&args.database)
        .with_context(|| format!("Failed to open database {:?}", args.database))?;
    println!("{}", db.headers());
    println!("Record size: {} bytes", db.record_size());
    println!("Records: {}", db.record_number());
    println!("File size: {} bytes", db.file_size());
    Ok(())
}
