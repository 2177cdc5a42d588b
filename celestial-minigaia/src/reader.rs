//! Read access to a Mini Gaia database.
//!
//! [`MiniGaiaDb::open`] reads and validates the header, derives the record
//! layout from it and counts the records from the file length. Records are
//! then streamed with [`MiniGaiaDb::records`], which seeks back to the first
//! record every time it is called.

use crate::error::{MiniGaiaError, Result};
use crate::header::{DbHeader, HEADER_SIZE};
use crate::layout::{Layout, Record};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

pub struct MiniGaiaDb<R: Read + Seek = BufReader<File>> {
    reader: R,
    header: DbHeader,
    layout: Layout,
    records_start: u64,
    records_end: u64,
    record_number: u64,
}

impl MiniGaiaDb<BufReader<File>> {
    /// Opens a database file and validates its header.
    ///
    /// # Errors
    /// [`Io`](MiniGaiaError::Io) if the file cannot be opened,
    /// [`InvalidVersion`](MiniGaiaError::InvalidVersion),
    /// [`LayoutMismatch`](MiniGaiaError::LayoutMismatch),
    /// [`UnsupportedType`](MiniGaiaError::UnsupportedType) or
    /// [`DegenerateRecord`](MiniGaiaError::DegenerateRecord) for a bad header,
    /// and [`TruncatedFile`](MiniGaiaError::TruncatedFile) when the data after
    /// the header is not a whole number of records.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let db = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            format = %db.header.format,
            records = db.record_number,
            "Opened database"
        );
        Ok(db)
    }
}

impl<R: Read + Seek> MiniGaiaDb<R> {
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let size = reader.seek(SeekFrom::End(0))?;
        let records_start = HEADER_SIZE as u64;
        if size < records_start {
            return Err(MiniGaiaError::TruncatedFile {
                size,
                header: records_start,
                record_size: 0,
            });
        }

        reader.seek(SeekFrom::Start(0))?;
        let mut bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut bytes)?;
        let header = DbHeader::from_bytes(&bytes);
        header.validate_version()?;
        let layout = Layout::from_header(&header)?;

        let record_size = layout.record_size() as u64;
        let data_size = size - records_start;
        if data_size % record_size != 0 {
            return Err(MiniGaiaError::TruncatedFile {
                size,
                header: records_start,
                record_size,
            });
        }

        Ok(Self {
            reader,
            header,
            layout,
            records_start,
            records_end: size,
            record_number: data_size / record_size,
        })
    }

    pub fn headers(&self) -> &DbHeader {
        &self.header
    }

    pub fn version(&self) -> &str {
        &self.header.version
    }

    pub fn format(&self) -> &str {
        &self.header.format
    }

    /// Space-separated column names as stored in the header.
    pub fn columns(&self) -> &str {
        &self.header.columns
    }

    pub fn column_names(&self) -> &[String] {
        self.layout.columns()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn record_size(&self) -> usize {
        self.layout.record_size()
    }

    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    pub fn records_start(&self) -> u64 {
        self.records_start
    }

    pub fn records_end(&self) -> u64 {
        self.records_end
    }

    pub fn file_size(&self) -> u64 {
        self.records_end
    }

    /// Iterates over all records from the first one.
    ///
    /// Calling this again restarts from the beginning. Iteration stops at
    /// `records_end` or at end of file, whichever comes first.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: &mut self.reader,
            layout: &self.layout,
            pos: self.records_start,
            start: self.records_start,
            end: self.records_end,
            buf: vec![0u8; self.layout.record_size()],
            started: false,
            done: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<'a, R: Read + Seek> IntoIterator for &'a mut MiniGaiaDb<R> {
    type Item = Result<Record>;
    type IntoIter = Records<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}

pub struct Records<'a, R: Read + Seek> {
    reader: &'a mut R,
    layout: &'a Layout,
    pos: u64,
    start: u64,
    end: u64,
    buf: Vec<u8>,
    started: bool,
    done: bool,
}

impl<R: Read + Seek> Records<'_, R> {
    fn fail(&mut self, err: impl Into<MiniGaiaError>) -> Option<Result<Record>> {
        self.done = true;
        Some(Err(err.into()))
    }
}

impl<R: Read + Seek> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            if let Err(e) = self.reader.seek(SeekFrom::Start(self.start)) {
                return self.fail(e);
            }
            self.started = true;
        }

        let record_size = self.buf.len() as u64;
        if self.pos + record_size > self.end {
            self.done = true;
            return None;
        }
        match self.reader.read_exact(&mut self.buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.done = true;
                return None;
            }
            Err(e) => return self.fail(e),
        }
        self.pos += record_size;
        Some(Ok(self.layout.decode_record(&self.buf)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = ((self.end - self.pos) / self.buf.len() as u64) as usize;
        (0, Some(remaining))
    }
}
