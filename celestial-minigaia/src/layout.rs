//! Record layouts: which columns a database stores, in which order, and how
//! wide each record is.
//!
//! A [`Layout`] pairs one [`PrimitiveType`] per column with the column names.
//! Position is the only link between a type and a name; records carry no tags.

use crate::codec::{MissingValues, PrimitiveType, Value, STRING_CAPACITY};
use crate::error::{MiniGaiaError, Result};
use crate::header::DbHeader;
use crate::schema::Schema;
use std::fmt;
use std::sync::Arc;

/// Non-fatal problems found while building a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// The space-joined column names exceed the header field and will be cut.
    ColumnsTruncated { len: usize, cap: usize },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::ColumnsTruncated { len, cap } => write!(
                f,
                "Not all column names can be stored in the db header ({} > {} characters)",
                len, cap
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    types: Vec<PrimitiveType>,
    columns: Arc<[String]>,
    offsets: Vec<usize>,
    record_size: usize,
    warnings: Vec<LayoutWarning>,
}

impl Layout {
    /// Resolves `columns` against `schema`.
    ///
    /// # Errors
    /// [`UnknownColumn`](MiniGaiaError::UnknownColumn) for a name the schema
    /// does not list, [`UnsupportedType`](MiniGaiaError::UnsupportedType) for
    /// a column whose type has no encoding,
    /// [`DegenerateRecord`](MiniGaiaError::DegenerateRecord) for an empty list
    /// and [`HeaderTooLarge`](MiniGaiaError::HeaderTooLarge) when there are
    /// more columns than the format field can describe.
    pub fn build<S: AsRef<str>>(schema: &Schema, columns: &[S]) -> Result<Self> {
        let mut types = Vec::with_capacity(columns.len());
        let mut names = Vec::with_capacity(columns.len());
        for name in columns {
            let name = name.as_ref();
            let def = schema
                .lookup(name)
                .ok_or_else(|| MiniGaiaError::UnknownColumn(name.to_string()))?;
            let ty = PrimitiveType::from_name(def.type_name).ok_or_else(|| {
                MiniGaiaError::UnsupportedType {
                    column: name.to_string(),
                    type_name: def.type_name.to_string(),
                }
            })?;
            types.push(ty);
            names.push(name.to_string());
        }
        if types.len() > STRING_CAPACITY {
            return Err(MiniGaiaError::HeaderTooLarge {
                field: "format",
                len: types.len(),
                cap: STRING_CAPACITY,
            });
        }
        Self::from_parts(types, names)
    }

    /// Rebuilds the layout described by a header read from disk.
    pub fn from_header(header: &DbHeader) -> Result<Self> {
        let names = header.column_names();
        let codes: Vec<char> = header.format.chars().collect();
        if codes.len() != names.len() {
            return Err(MiniGaiaError::LayoutMismatch {
                formats: codes.len(),
                columns: names.len(),
            });
        }
        let types = codes
            .iter()
            .zip(&names)
            .map(|(&code, &name)| {
                PrimitiveType::from_code(code).ok_or_else(|| MiniGaiaError::UnsupportedType {
                    column: name.to_string(),
                    type_name: code.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_parts(types, names.into_iter().map(str::to_string).collect())
    }

    fn from_parts(types: Vec<PrimitiveType>, columns: Vec<String>) -> Result<Self> {
        if types.len() != columns.len() {
            return Err(MiniGaiaError::LayoutMismatch {
                formats: types.len(),
                columns: columns.len(),
            });
        }
        let mut offsets = Vec::with_capacity(types.len());
        let mut record_size = 0;
        for ty in &types {
            offsets.push(record_size);
            record_size += ty.width();
        }
        if record_size == 0 {
            return Err(MiniGaiaError::DegenerateRecord);
        }

        let mut warnings = Vec::new();
        let joined_len = columns.iter().map(String::len).sum::<usize>() + columns.len() - 1;
        if joined_len > STRING_CAPACITY {
            warnings.push(LayoutWarning::ColumnsTruncated {
                len: joined_len,
                cap: STRING_CAPACITY,
            });
        }

        Ok(Self {
            types,
            columns: columns.into(),
            offsets,
            record_size,
            warnings,
        })
    }

    pub fn types(&self) -> &[PrimitiveType] {
        &self.types
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    /// One type code per column, e.g. `"qdd"`.
    pub fn format_string(&self) -> String {
        self.types.iter().map(|t| t.code()).collect()
    }

    /// Column names joined by single spaces.
    pub fn column_string(&self) -> String {
        self.columns.join(" ")
    }

    pub fn header(&self) -> DbHeader {
        DbHeader::new(self.format_string(), self.column_string())
    }

    /// Encodes one row of text values, given in column order, into `out`
    /// (exactly [`record_size`](Self::record_size) bytes).
    pub fn encode_row<'a, I>(&self, values: I, missing: MissingValues, out: &mut [u8]) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        debug_assert_eq!(out.len(), self.record_size);
        let mut count = 0;
        for (idx, text) in values.into_iter().enumerate().take(self.types.len()) {
            let ty = self.types[idx];
            let start = self.offsets[idx];
            ty.encode_into(text, &self.columns[idx], missing, &mut out[start..start + ty.width()])?;
            count += 1;
        }
        if count != self.types.len() {
            return Err(MiniGaiaError::LayoutMismatch {
                formats: self.types.len(),
                columns: count,
            });
        }
        Ok(())
    }

    /// Decodes one record. `bytes` must be exactly one record long.
    pub fn decode_record(&self, bytes: &[u8]) -> Record {
        let values = self
            .types
            .iter()
            .zip(&self.offsets)
            .map(|(ty, &start)| ty.decode(&bytes[start..start + ty.width()]))
            .collect();
        Record {
            columns: Arc::clone(&self.columns),
            values,
        }
    }
}

/// A decoded record: column names and their values, in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
