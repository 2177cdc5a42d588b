//! The three-field database header.
//!
//! ```text
//! offset   0  version   u8 length + 255 bytes
//! offset 256  format    u8 length + 255 bytes, one type code per column
//! offset 512  columns   u8 length + 255 bytes, space-separated names
//! offset 768  first record
//! ```

use crate::codec::{read_pascal, truncate_utf8, write_pascal, PASCAL_FIELD_SIZE, STRING_CAPACITY};
use crate::error::{MiniGaiaError, Result};
use std::fmt;

pub const VERSION_STRING: &str = "Mini Gaia DB 1.0";
pub const HEADER_FIELD_SIZE: usize = PASCAL_FIELD_SIZE;
pub const HEADER_SIZE: usize = 3 * HEADER_FIELD_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbHeader {
    pub version: String,
    pub format: String,
    pub columns: String,
}

impl DbHeader {
    pub fn new(format: impl Into<String>, columns: impl Into<String>) -> Self {
        Self {
            version: VERSION_STRING.to_string(),
            format: format.into(),
            columns: columns.into(),
        }
    }

    /// Parses the raw fields without validating them; see
    /// [`validate_version`](Self::validate_version) and
    /// [`crate::Layout::from_header`].
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let field = |i: usize| read_pascal(&bytes[i * HEADER_FIELD_SIZE..(i + 1) * HEADER_FIELD_SIZE]);
        Self {
            version: field(0),
            format: field(1),
            columns: field(2),
        }
    }

    /// Serializes the header. Fields longer than the capacity are cut; use
    /// [`check_capacity`](Self::check_capacity) first to detect that.
    ///
    /// An oversized column field keeps only whole names, so the stored name
    /// count is always short of the format count and the reader reports
    /// [`LayoutMismatch`](MiniGaiaError::LayoutMismatch).
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let columns = whole_names(&self.columns, STRING_CAPACITY);
        for (i, value) in [self.version.as_str(), self.format.as_str(), columns]
            .into_iter()
            .enumerate()
        {
            write_pascal(
                &mut bytes[i * HEADER_FIELD_SIZE..(i + 1) * HEADER_FIELD_SIZE],
                value,
            );
        }
        bytes
    }

    /// Fields that do not fit, as `(field name, byte length)`.
    pub fn oversized_fields(&self) -> Vec<(&'static str, usize)> {
        [
            ("version", self.version.len()),
            ("format", self.format.len()),
            ("columns", self.columns.len()),
        ]
        .into_iter()
        .filter(|&(_, len)| len > STRING_CAPACITY)
        .collect()
    }

    /// Fails with [`MiniGaiaError::HeaderTooLarge`] on the first oversized field.
    pub fn check_capacity(&self) -> Result<()> {
        match self.oversized_fields().first() {
            Some(&(field, len)) => Err(MiniGaiaError::HeaderTooLarge {
                field,
                len,
                cap: STRING_CAPACITY,
            }),
            None => Ok(()),
        }
    }

    pub fn validate_version(&self) -> Result<()> {
        if self.version != VERSION_STRING {
            return Err(MiniGaiaError::InvalidVersion {
                expected: VERSION_STRING.to_string(),
                actual: self.version.clone(),
            });
        }
        Ok(())
    }

    /// Column names in header order. An empty field yields no names.
    pub fn column_names(&self) -> Vec<&str> {
        if self.columns.is_empty() {
            return Vec::new();
        }
        self.columns.split(' ').collect()
    }
}

/// Longest prefix of `columns` within `cap` bytes that ends on a whole name.
fn whole_names(columns: &str, cap: usize) -> &str {
    if columns.len() <= cap {
        return columns;
    }
    let cut = truncate_utf8(columns, cap);
    if columns[cut.len()..].starts_with(' ') {
        return cut;
    }
    cut.rfind(' ').map_or("", |pos| &cut[..pos])
}

impl fmt::Display for DbHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Format: {}", self.format)?;
        write!(f, "Columns: {}", self.columns)
    }
}
