//! CSV → database conversion

use crate::cli::{Cli, ConvertArgs};
use anyhow::Context;
use celestial_minigaia::codec::MissingValues;
use celestial_minigaia::writer::find_input_files;
use celestial_minigaia::{convert_with_progress, ConvertOptions, ConvertReport, Schema};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a `--config` file. Options sit at the top level next to
/// `columns`.
#[derive(Debug, Default, Deserialize)]
struct ConvertConfig {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(flatten)]
    options: ConvertOptions,
}

pub fn run(args: &ConvertArgs, cli: &Cli) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConvertConfig::default(),
    };
    let (columns, options) = merge_args(args, config);
    if columns.is_empty() {
        anyhow::bail!("No columns given (use --columns or a config file)");
    }

    // Only sizes the progress bar; a missing directory is reported by the
    // conversion itself, after the columns are validated.
    let file_count = find_input_files(&args.path, &options.input_suffix)
        .map(|files| files.len())
        .unwrap_or(0);
    print_plan(args, &columns, &options, file_count, cli);

    let pb = create_progress_bar(file_count as u64);
    let report = convert_with_progress(
        &args.path,
        &args.output,
        &columns,
        &Schema::gaia_dr2(),
        &options,
        |file| {
            let name = file.path.file_name().unwrap_or_default().to_string_lossy();
            pb.set_message(format!("{} ({} records)", name, file.records));
            pb.inc(1);
        },
    );
    pb.finish_and_clear();

    let report = report.with_context(|| format!("Conversion into {:?} failed", args.output))?;
    print_report(&report);
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<ConvertConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    toml::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))
}

/// Command-line values win over the config file.
fn merge_args(args: &ConvertArgs, config: ConvertConfig) -> (Vec<String>, ConvertOptions) {
    let columns = if args.columns.is_empty() {
        config.columns
    } else {
        args.columns.clone()
    };
    let mut options = config.options;
    if args.strict_header {
        options.strict_header = true;
    }
    if args.fill_missing {
        options.missing_values = MissingValues::Fill;
    }
    (columns, options)
}

fn print_plan(
    args: &ConvertArgs,
    columns: &[String],
    options: &ConvertOptions,
    file_count: usize,
    cli: &Cli,
) {
    println!("=== Mini Gaia DB Conversion ===");
    println!("Input directory: {:?}", args.path);
    println!("Files found: {}", file_count);
    println!("Columns: {}", columns.join(" "));
    println!("Output: {:?}", args.output);
    println!("Strict header: {}", options.strict_header);
    println!("Missing values: {:?}", options.missing_values);
    println!("Verbose: {}", cli.verbose);
    println!();
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

fn print_report(report: &ConvertReport) {
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
    println!("Format: {}", report.format);
    println!("Record size: {} bytes", report.record_size);
    println!("Files converted: {}", report.files.len());
    println!("Total records: {}", report.total_records);
    println!("Written to {:?}", report.output);
}
