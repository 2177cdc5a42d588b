//! Error taxonomy for building, writing and reading Mini Gaia databases.
//!
//! | Variant | Raised by | Fatal? |
//! |---------|-----------|--------|
//! | [`UnknownColumn`](MiniGaiaError::UnknownColumn) | layout build | yes, before any I/O |
//! | [`UnsupportedType`](MiniGaiaError::UnsupportedType) | layout build, open | yes |
//! | [`MalformedValue`](MiniGaiaError::MalformedValue) | row encoding | aborts the conversion |
//! | [`MissingColumn`](MiniGaiaError::MissingColumn) | CSV header check | aborts the conversion |
//! | [`HeaderTooLarge`](MiniGaiaError::HeaderTooLarge) | header write | only in strict mode, or for `format` |
//! | [`InvalidVersion`](MiniGaiaError::InvalidVersion) | open | yes |
//! | [`LayoutMismatch`](MiniGaiaError::LayoutMismatch) | open | yes |
//! | [`DegenerateRecord`](MiniGaiaError::DegenerateRecord) | layout build, open | yes |
//! | [`TruncatedFile`](MiniGaiaError::TruncatedFile) | open | yes |
//! | [`RecordSize`](MiniGaiaError::RecordSize) | pre-encoded record write | yes |

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiniGaiaError {
    #[error("Column {0:?} is not listed in the schema")]
    UnknownColumn(String),

    #[error("Type {type_name:?} of column {column:?} not supported")]
    UnsupportedType { column: String, type_name: String },

    #[error("Cannot parse {value:?} as {type_name} for column {column:?}")]
    MalformedValue {
        column: String,
        value: String,
        type_name: &'static str,
    },

    #[error("Column {column:?} missing from header of {file:?}")]
    MissingColumn { column: String, file: PathBuf },

    #[error("Header field {field} is {len} bytes, capacity is {cap}")]
    HeaderTooLarge {
        field: &'static str,
        len: usize,
        cap: usize,
    },

    #[error("Invalid version, expected {expected:?}, got {actual:?}")]
    InvalidVersion { expected: String, actual: String },

    #[error("Number of columns ({columns}) differs from format fields ({formats})")]
    LayoutMismatch { formats: usize, columns: usize },

    #[error("Record size equals zero, no columns in layout")]
    DegenerateRecord,

    #[error("File truncated: {size} bytes is not header ({header}) plus whole records of {record_size} bytes")]
    TruncatedFile {
        size: u64,
        header: u64,
        record_size: u64,
    },

    #[error("Record is {actual} bytes, layout expects {expected}")]
    RecordSize { expected: usize, actual: usize },

    #[error("Column {0:?} defined more than once")]
    DuplicateColumn(String),

    #[error("Invalid CSV in {file:?}: {reason}")]
    InvalidCsv { file: PathBuf, reason: String },

    #[error("{file:?} row {row}: {source}")]
    Row {
        file: PathBuf,
        row: u64,
        #[source]
        source: Box<MiniGaiaError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MiniGaiaError>;

impl MiniGaiaError {
    /// Wraps a per-row failure with the file and 1-based data row it came from.
    pub(crate) fn in_row(self, file: &std::path::Path, row: u64) -> Self {
        MiniGaiaError::Row {
            file: file.to_path_buf(),
            row,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through row context.
    pub fn root(&self) -> &MiniGaiaError {
        match self {
            MiniGaiaError::Row { source, .. } => source.root(),
            other => other,
        }
    }
}
