//! Whole-database scans built on the record iterator.

use crate::codec::PrimitiveType;
use crate::error::{MiniGaiaError, Result};
use crate::reader::MiniGaiaDb;
use std::fmt;
use std::io::{Read, Seek};

/// Number of one-magnitude bins, covering magnitudes `[0, 28)`.
pub const MAGNITUDE_BINS: usize = 28;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnitudeHistogram {
    bins: [u64; MAGNITUDE_BINS],
    total: u64,
    out_of_range: u64,
}

impl MagnitudeHistogram {
    fn new() -> Self {
        Self {
            bins: [0; MAGNITUDE_BINS],
            total: 0,
            out_of_range: 0,
        }
    }

    fn add(&mut self, mag: f64) {
        self.total += 1;
        if mag.is_finite() && mag >= 0.0 && mag < MAGNITUDE_BINS as f64 {
            self.bins[mag.trunc() as usize] += 1;
        } else {
            self.out_of_range += 1;
        }
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Records scanned, including those outside the binned range.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Records that were NaN, negative or 28 and fainter.
    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    pub fn percentage(&self, bin: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.bins[bin] as f64 / self.total as f64 * 100.0
    }
}

impl fmt::Display for MagnitudeHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (mag, count) in self.bins.iter().enumerate() {
            writeln!(f, "Mag {}: {} ({:.4}%)", mag, count, self.percentage(mag))?;
        }
        write!(f, "Out of range: {}", self.out_of_range)
    }
}

/// Counts records per integer magnitude of a numeric `column`.
///
/// # Errors
/// [`UnknownColumn`](MiniGaiaError::UnknownColumn) if the database does not
/// store `column`, [`UnsupportedType`](MiniGaiaError::UnsupportedType) if it
/// is not numeric, or any error raised while reading records.
pub fn magnitude_histogram<R: Read + Seek>(
    db: &mut MiniGaiaDb<R>,
    column: &str,
) -> Result<MagnitudeHistogram> {
    let idx = db
        .column_names()
        .iter()
        .position(|c| c == column)
        .ok_or_else(|| MiniGaiaError::UnknownColumn(column.to_string()))?;
    let ty = db.layout().types()[idx];
    if matches!(ty, PrimitiveType::Boolean | PrimitiveType::String) {
        return Err(MiniGaiaError::UnsupportedType {
            column: column.to_string(),
            type_name: ty.name().to_string(),
        });
    }

    let mut histogram = MagnitudeHistogram::new();
    for record in db.records() {
        let record = record?;
        if let Some(mag) = record.values()[idx].as_f64() {
            histogram.add(mag);
        }
    }
    Ok(histogram)
}
