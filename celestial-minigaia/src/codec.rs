//! Primitive column types and their fixed-width binary encodings.
//!
//! Every type has a one-character format code, stored in the database header,
//! and a fixed byte width. Numbers are little-endian with no padding between
//! fields.
//!
//! | Type | Code | Width | Rust value |
//! |------|------|-------|------------|
//! | boolean | `?` | 1 | `bool` |
//! | byte | `B` | 1 | `u8` |
//! | short | `h` | 2 | `i16` |
//! | int | `i` | 4 | `i32` |
//! | long | `q` | 8 | `i64` |
//! | float | `f` | 4 | `f32` |
//! | double | `d` | 8 | `f64` |
//! | string | `p` | 256 | length byte + 255 bytes of text |
//!
//! Strings longer than [`STRING_CAPACITY`] bytes are truncated without error.

use crate::error::{MiniGaiaError, Result};
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum text payload of a string field and of each header field.
pub const STRING_CAPACITY: usize = 255;

/// On-disk width of a length-prefixed text field.
pub const PASCAL_FIELD_SIZE: usize = STRING_CAPACITY + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

/// What to do with an empty (or `null`) numeric field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValues {
    /// Fail with [`MiniGaiaError::MalformedValue`].
    #[default]
    Reject,
    /// Store NaN for floats, zero for integers and `false` for booleans.
    Fill,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::String,
    ];

    /// Resolves a catalog type name. `None` means the type has no encoding.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(PrimitiveType::Boolean),
            "byte" => Some(PrimitiveType::Byte),
            "short" => Some(PrimitiveType::Short),
            "int" => Some(PrimitiveType::Int),
            "long" => Some(PrimitiveType::Long),
            "float" => Some(PrimitiveType::Float),
            "double" => Some(PrimitiveType::Double),
            "string" => Some(PrimitiveType::String),
            _ => None,
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "string",
        }
    }

    pub fn code(self) -> char {
        match self {
            PrimitiveType::Boolean => '?',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'h',
            PrimitiveType::Int => 'i',
            PrimitiveType::Long => 'q',
            PrimitiveType::Float => 'f',
            PrimitiveType::Double => 'd',
            PrimitiveType::String => 'p',
        }
    }

    pub fn width(self) -> usize {
        match self {
            PrimitiveType::Boolean | PrimitiveType::Byte => 1,
            PrimitiveType::Short => 2,
            PrimitiveType::Int | PrimitiveType::Float => 4,
            PrimitiveType::Long | PrimitiveType::Double => 8,
            PrimitiveType::String => PASCAL_FIELD_SIZE,
        }
    }

    /// Parses `text` and writes its binary form into `out`, which must be
    /// exactly [`width`](Self::width) bytes long.
    pub fn encode_into(
        self,
        text: &str,
        column: &str,
        missing: MissingValues,
        out: &mut [u8],
    ) -> Result<()> {
        debug_assert_eq!(out.len(), self.width());
        if self == PrimitiveType::String {
            write_pascal(out, text);
            return Ok(());
        }

        let trimmed = text.trim();
        if missing == MissingValues::Fill && is_missing(trimmed) {
            self.encode_missing(out);
            return Ok(());
        }

        let malformed = || MiniGaiaError::MalformedValue {
            column: column.to_string(),
            value: text.to_string(),
            type_name: self.name(),
        };

        match self {
            PrimitiveType::Boolean => out[0] = parse_bool(trimmed).ok_or_else(malformed)? as u8,
            PrimitiveType::Byte => out[0] = trimmed.parse::<u8>().map_err(|_| malformed())?,
            PrimitiveType::Short => {
                LittleEndian::write_i16(out, trimmed.parse().map_err(|_| malformed())?)
            }
            PrimitiveType::Int => {
                LittleEndian::write_i32(out, trimmed.parse().map_err(|_| malformed())?)
            }
            PrimitiveType::Long => {
                LittleEndian::write_i64(out, trimmed.parse().map_err(|_| malformed())?)
            }
            PrimitiveType::Float => {
                LittleEndian::write_f32(out, trimmed.parse().map_err(|_| malformed())?)
            }
            PrimitiveType::Double => {
                LittleEndian::write_f64(out, trimmed.parse().map_err(|_| malformed())?)
            }
            PrimitiveType::String => unreachable!(),
        }
        Ok(())
    }

    /// Convenience wrapper around [`encode_into`](Self::encode_into) that
    /// allocates the output buffer.
    pub fn encode(self, text: &str, column: &str, missing: MissingValues) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.width()];
        self.encode_into(text, column, missing, &mut out)?;
        Ok(out)
    }

    /// Decodes one field. `bytes` must be exactly [`width`](Self::width) long.
    pub fn decode(self, bytes: &[u8]) -> Value {
        match self {
            PrimitiveType::Boolean => Value::Bool(bytes[0] != 0),
            PrimitiveType::Byte => Value::Byte(bytes[0]),
            PrimitiveType::Short => Value::Short(LittleEndian::read_i16(bytes)),
            PrimitiveType::Int => Value::Int(LittleEndian::read_i32(bytes)),
            PrimitiveType::Long => Value::Long(LittleEndian::read_i64(bytes)),
            PrimitiveType::Float => Value::Float(LittleEndian::read_f32(bytes)),
            PrimitiveType::Double => Value::Double(LittleEndian::read_f64(bytes)),
            PrimitiveType::String => Value::Text(read_pascal(bytes)),
        }
    }

    fn encode_missing(self, out: &mut [u8]) {
        match self {
            PrimitiveType::Float => LittleEndian::write_f32(out, f32::NAN),
            PrimitiveType::Double => LittleEndian::write_f64(out, f64::NAN),
            _ => out.fill(0),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_missing(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" => Some(true),
        "0" => Some(false),
        _ if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("t") => Some(true),
        _ if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("f") => Some(false),
        _ => None,
    }
}

/// Cuts `s` to at most `cap` bytes without splitting a UTF-8 sequence.
pub(crate) fn truncate_utf8(s: &str, cap: usize) -> &str {
    if s.len() <= cap {
        return s;
    }
    let mut end = cap;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Writes a length-prefixed string filling all of `buf`, zero padded.
pub(crate) fn write_pascal(buf: &mut [u8], s: &str) {
    let payload = truncate_utf8(s, buf.len() - 1).as_bytes();
    buf[0] = payload.len() as u8;
    buf[1..=payload.len()].copy_from_slice(payload);
    buf[payload.len() + 1..].fill(0);
}

/// Reads a length-prefixed string. A length byte larger than the field is
/// clamped so the read never leaves `buf`.
pub(crate) fn read_pascal(buf: &[u8]) -> String {
    let len = (buf[0] as usize).min(buf.len() - 1);
    String::from_utf8_lossy(&buf[1..=len]).into_owned()
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Byte(v) => Some(v as f64),
            Value::Short(v) => Some(v as f64),
            Value::Int(v) => Some(v as f64),
            Value::Long(v) => Some(v as f64),
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            Value::Bool(_) | Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Bool(v) => Some(v as i64),
            Value::Byte(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}
