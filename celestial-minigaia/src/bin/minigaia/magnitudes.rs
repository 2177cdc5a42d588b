//! Integer-magnitude histogram

use crate::cli::MagnitudesArgs;
use anyhow::Context;
use celestial_minigaia::{magnitude_histogram, MiniGaiaDb};

pub fn run(args: &MagnitudesArgs) -> anyhow::Result<()> {
    let mut db = MiniGaiaDb::open(&args.database)
        .with_context(|| format!("Failed to open database {:?}", args.database))?;
    let histogram = magnitude_histogram(&mut db, &args.column)
        .with_context(|| format!("Failed to bin column {}", args.column))?;
    println!("Records: {}", histogram.total());
    println!("{}", histogram);
    Ok(())
}
