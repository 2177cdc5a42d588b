//! Database writer and the CSV → binary conversion pipeline.
//!
//! [`DbWriter`] writes the header and appends encoded records. [`convert`]
//! drives it over a directory of gzipped CSV files, one file and one record
//! buffer in memory at a time. The database is written to `<output>.tmp` and
//! renamed into place only after every input file converted cleanly.

use crate::codec::MissingValues;
use crate::csv::CsvRows;
use crate::error::{MiniGaiaError, Result};
use crate::header::DbHeader;
use crate::layout::{Layout, LayoutWarning};
use crate::schema::Schema;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// File name suffix selecting input files.
    pub input_suffix: String,
    /// Treat a header field that would be truncated as an error.
    pub strict_header: bool,
    pub missing_values: MissingValues,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input_suffix: ".csv.gz".to_string(),
            strict_header: false,
            missing_values: MissingValues::Reject,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub records: u64,
}

#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub output: PathBuf,
    pub format: String,
    pub columns: String,
    pub record_size: usize,
    pub files: Vec<FileReport>,
    pub total_records: u64,
    pub warnings: Vec<LayoutWarning>,
}

pub struct DbWriter<W: Write = BufWriter<File>> {
    writer: W,
    layout: Layout,
    record_buf: Vec<u8>,
    missing: MissingValues,
    records_written: u64,
}

impl DbWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the header for `layout`.
    pub fn create<P: AsRef<Path>>(path: P, layout: Layout, strict_header: bool) -> Result<Self> {
        let header = checked_header(&layout, strict_header)?;
        let file = File::create(path.as_ref())?;
        Self::start(BufWriter::new(file), layout, &header)
    }
}

impl<W: Write> DbWriter<W> {
    pub fn from_writer(writer: W, layout: Layout, strict_header: bool) -> Result<Self> {
        let header = checked_header(&layout, strict_header)?;
        Self::start(writer, layout, &header)
    }

    fn start(mut writer: W, layout: Layout, header: &DbHeader) -> Result<Self> {
        writer.write_all(&header.to_bytes())?;
        Ok(Self {
            writer,
            record_buf: vec![0u8; layout.record_size()],
            layout,
            missing: MissingValues::Reject,
            records_written: 0,
        })
    }

    pub fn with_missing_values(mut self, missing: MissingValues) -> Self {
        self.missing = missing;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Encodes one row, values in layout column order, and appends it.
    pub fn write_row<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.layout
            .encode_row(values, self.missing, &mut self.record_buf)?;
        self.writer.write_all(&self.record_buf)?;
        self.records_written += 1;
        Ok(())
    }

    /// Appends a record that is already in binary form, such as one copied
    /// from another database with the same layout.
    pub fn write_encoded(&mut self, record: &[u8]) -> Result<()> {
        if record.len() != self.layout.record_size() {
            return Err(MiniGaiaError::RecordSize {
                expected: self.layout.record_size(),
                actual: record.len(),
            });
        }
        self.writer.write_all(record)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flushes buffered records and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn checked_header(layout: &Layout, strict: bool) -> Result<DbHeader> {
    let header = layout.header();
    if strict {
        header.check_capacity()?;
    } else {
        for (field, len) in header.oversized_fields() {
            warn!(field, len, "Header field truncated to {} bytes", crate::codec::STRING_CAPACITY);
        }
    }
    Ok(header)
}

/// Converts every matching file in `input_dir` into a database at `output`.
///
/// Columns are validated against `schema` before anything is created. Any
/// error after that aborts the run and removes the partial output.
pub fn convert<S: AsRef<str>>(
    input_dir: &Path,
    output: &Path,
    columns: &[S],
    schema: &Schema,
    options: &ConvertOptions,
) -> Result<ConvertReport> {
    convert_with_progress(input_dir, output, columns, schema, options, |_| {})
}

/// Like [`convert`], calling `on_file` after each input file is appended.
pub fn convert_with_progress<S, F>(
    input_dir: &Path,
    output: &Path,
    columns: &[S],
    schema: &Schema,
    options: &ConvertOptions,
    mut on_file: F,
) -> Result<ConvertReport>
where
    S: AsRef<str>,
    F: FnMut(&FileReport),
{
    let layout = Layout::build(schema, columns)?;
    if options.strict_header {
        layout.header().check_capacity()?;
    }
    if !input_dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input directory not found: {}", input_dir.display()),
        )
        .into());
    }

    let files = find_input_files(input_dir, &options.input_suffix)?;
    if files.is_empty() {
        warn!(dir = %input_dir.display(), suffix = %options.input_suffix, "No input files found");
    }
    debug!(count = files.len(), "Discovered input files");

    let temp = temp_path(output)?;
    let mut report = ConvertReport {
        output: output.to_path_buf(),
        format: layout.format_string(),
        columns: layout.column_string(),
        record_size: layout.record_size(),
        files: Vec::with_capacity(files.len()),
        total_records: 0,
        warnings: layout.warnings().to_vec(),
    };

    let result = write_database(&temp, layout, &files, options, |file_report| {
        on_file(&file_report);
        report.files.push(file_report);
    });
    match result {
        Ok(total) => {
            fs::rename(&temp, output)?;
            report.total_records = total;
            info!(
                output = %output.display(),
                files = report.files.len(),
                records = total,
                "Conversion finished"
            );
            Ok(report)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&temp) {
                debug!(error = %rm, "Could not remove partial output");
            }
            Err(e)
        }
    }
}

fn write_database<F>(
    path: &Path,
    layout: Layout,
    files: &[PathBuf],
    options: &ConvertOptions,
    mut on_file: F,
) -> Result<u64>
where
    F: FnMut(FileReport),
{
    let columns = layout.columns().to_vec();
    let mut writer = DbWriter::create(path, layout, options.strict_header)?
        .with_missing_values(options.missing_values);
    for file in files {
        let records = append_file(&mut writer, file, &columns)?;
        info!(file = %file.display(), records, "Converted file");
        on_file(FileReport {
            path: file.clone(),
            records,
        });
    }
    let total = writer.records_written();
    let file = writer.finish()?.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(total)
}

fn append_file<W: Write>(writer: &mut DbWriter<W>, path: &Path, columns: &[String]) -> Result<u64> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut rows = CsvRows::new(BufReader::new(decoder), path)?;
    let indices = rows.column_indices(columns)?;
    let mut written = 0u64;
    while let Some(row) = rows.next_row()? {
        writer
            .write_row(indices.iter().map(|&idx| row.get(idx).unwrap_or_default()))
            .map_err(|e| e.in_row(path, written + 1))?;
        written += 1;
    }
    Ok(written)
}

/// Input files in `dir` whose name ends with `suffix`, sorted by path.
pub fn find_input_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn temp_path(output: &Path) -> Result<PathBuf> {
    let name = output.file_name().ok_or_else(|| {
        MiniGaiaError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path has no file name: {}", output.display()),
        ))
    })?;
    let mut temp_name = name.to_os_string();
    temp_name.push(".tmp");
    Ok(output.with_file_name(temp_name))
}
