//! Record dump

use crate::cli::DumpArgs;
use anyhow::Context;
use celestial_minigaia::MiniGaiaDb;
use std::io::{self, BufWriter, Write};

pub fn run(args: &DumpArgs) -> anyhow::Result<()> {
    let mut db = MiniGaiaDb::open(&args.database)
        .with_context(|| format!("Failed to open database {:?}", args.database))?;
    let limit = args.limit.unwrap_or(usize::MAX);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", db.column_names().join(" "))?;
    for (n, record) in db.records().take(limit).enumerate() {
        let record = record.with_context(|| format!("Failed to read record {}", n))?;
        let line: Vec<String> = record.values().iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;
    Ok(())
}
