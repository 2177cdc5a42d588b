//! Compact fixed-record binary database for Gaia catalog subsets.
//!
//! Converts a directory of gzipped Gaia DR2 CSV files into a single file of
//! fixed-size binary records holding only the columns you ask for, and reads
//! it back as a stream of typed records. A self-describing header stores the
//! per-column type codes and names, so a reader needs nothing but the file.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`schema`] | [`Schema`] column registry, [`Schema::gaia_dr2`] built-in |
//! | [`codec`] | [`PrimitiveType`] codes, widths, text → bytes → [`Value`] |
//! | [`layout`] | [`Layout`] built from columns or a header, [`Record`] decoding |
//! | [`header`] | [`DbHeader`], the three 256-byte Pascal string fields |
//! | [`csv`] | Streaming header-aware CSV rows |
//! | [`writer`] | [`DbWriter`], [`convert`] pipeline, [`ConvertOptions`] |
//! | [`reader`] | [`MiniGaiaDb`] reader and the restartable [`Records`] iterator |
//! | [`stats`] | Whole-database scans such as [`magnitude_histogram`] |
//!
//! # Quick Start
//!
//! ```ignore
//! use celestial_minigaia::{convert, ConvertOptions, MiniGaiaDb, Schema};
//! use std::path::Path;
//!
//! convert(
//!     Path::new("gdr2/gaia_source/csv"),
//!     Path::new("gaia.db"),
//!     &["source_id", "ra", "dec", "phot_g_mean_mag"],
//!     &Schema::gaia_dr2(),
//!     &ConvertOptions::default(),
//! )?;
//!
//! let mut db = MiniGaiaDb::open("gaia.db")?;
//! println!("{}", db.headers());
//! for record in &mut db {
//!     let record = record?;
//!     println!("{:?}", record.get("ra"));
//! }
//! ```
//!
//! # Binary Format
//!
//! A 768-byte header of three Pascal strings (a length byte plus 255 payload
//! bytes each: version, format codes, space-joined column names) followed by
//! `N × record_size` bytes of packed little-endian records. Each string column
//! takes a full 256-byte Pascal field.
//!
//! # Features
//!
//! - **`cli`** — Enables the `minigaia` binary for converting and inspecting
//!   databases from the command line.

pub mod codec;
pub mod csv;
pub mod error;
pub mod header;
pub mod layout;
pub mod reader;
pub mod schema;
pub mod stats;
pub mod writer;

pub use codec::{MissingValues, PrimitiveType, Value};
pub use error::{MiniGaiaError, Result};
pub use header::{DbHeader, HEADER_SIZE, VERSION_STRING};
pub use layout::{Layout, LayoutWarning, Record};
pub use reader::{MiniGaiaDb, Records};
pub use schema::{ColumnDef, Schema};
pub use stats::{magnitude_histogram, MagnitudeHistogram};
pub use writer::{convert, convert_with_progress, ConvertOptions, ConvertReport, DbWriter, FileReport};
