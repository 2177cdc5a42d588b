//! Header-aware reader for catalog CSV files.
//!
//! Accepts the plain DR2 layout (one header row, then data) as well as ECSV,
//! whose `#` metadata lines are skipped. Rows are returned as borrowed views
//! into an internal line buffer, so a file is read one line at a time.

use crate::error::{MiniGaiaError, Result};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

pub struct CsvRows<R: BufRead> {
    reader: R,
    source: PathBuf,
    header: Vec<String>,
    line_buf: String,
    spans: Vec<(usize, usize)>,
    line_no: u64,
    rows_read: u64,
}

impl<R: BufRead> CsvRows<R> {
    /// Reads up to and including the header row. `source` names the input in
    /// error messages.
    pub fn new(mut reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut line = String::new();
        let mut line_no = 0;
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(MiniGaiaError::InvalidCsv {
                    file: source,
                    reason: "EOF before finding header".to_string(),
                });
            }
            line_no += 1;
            let trimmed = trim_line_end(&line);
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                break;
            }
        }

        let mut spans = Vec::new();
        let trimmed = trim_line_end(&line);
        split_fields(trimmed, &mut spans);
        let header = spans
            .iter()
            .map(|&(start, end)| trimmed[start..end].trim().to_string())
            .collect();

        Ok(Self {
            reader,
            source,
            header,
            line_buf: String::with_capacity(4096),
            spans,
            line_no,
            rows_read: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.header
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Data rows returned so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Position of each requested column in this file's header.
    ///
    /// # Errors
    /// [`MissingColumn`](MiniGaiaError::MissingColumn) naming the first
    /// requested column the header lacks.
    pub fn column_indices<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        let col_map: HashMap<&str, usize> = self
            .header
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.as_str(), idx))
            .collect();
        names
            .iter()
            .map(|name| {
                col_map
                    .get(name.as_ref())
                    .copied()
                    .ok_or_else(|| MiniGaiaError::MissingColumn {
                        column: name.as_ref().to_string(),
                        file: self.source.clone(),
                    })
            })
            .collect()
    }

    /// Returns the next data row, or `None` at end of input.
    pub fn next_row(&mut self) -> Result<Option<Row<'_>>> {
        loop {
            self.line_buf.clear();
            if self.reader.read_line(&mut self.line_buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = trim_line_end(&self.line_buf);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            split_fields(line, &mut self.spans);
            if self.spans.len() != self.header.len() {
                return Err(MiniGaiaError::InvalidCsv {
                    file: self.source.clone(),
                    reason: format!(
                        "line {} has {} fields, header has {}",
                        self.line_no,
                        self.spans.len(),
                        self.header.len()
                    ),
                });
            }
            self.rows_read += 1;
            return Ok(Some(Row {
                line: trim_line_end(&self.line_buf),
                spans: &self.spans,
            }));
        }
    }
}

/// One data row, borrowed from the reader.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    line: &'a str,
    spans: &'a [(usize, usize)],
}

impl<'a> Row<'a> {
    pub fn get(&self, idx: usize) -> Option<&'a str> {
        self.spans.get(idx).map(|&(start, end)| &self.line[start..end])
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Splits on commas outside double quotes. Surrounding quotes are dropped
/// from the field span; doubled quotes inside a field are kept as-is.
fn split_fields(line: &str, spans: &mut Vec<(usize, usize)>) {
    spans.clear();
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                spans.push(unquote(bytes, start, idx));
                start = idx + 1;
            }
            _ => {}
        }
    }
    spans.push(unquote(bytes, start, bytes.len()));
}

fn unquote(bytes: &[u8], start: usize, end: usize) -> (usize, usize) {
    if end - start >= 2 && bytes[start] == b'"' && bytes[end - 1] == b'"' {
        (start + 1, end - 1)
    } else {
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rows(data: &str) -> CsvRows<Cursor<Vec<u8>>> {
        CsvRows::new(Cursor::new(data.as_bytes().to_vec()), "test.csv").unwrap()
    }

    fn collect(mut csv: CsvRows<Cursor<Vec<u8>>>) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        while let Some(row) = csv.next_row().unwrap() {
            out.push((0..row.len()).map(|i| row.get(i).unwrap().to_string()).collect());
        }
        out
    }

    #[test]
    fn test_header_and_rows() {
        let csv = rows("source_id,ra,dec\n1,10.5,-5.25\n2,11.0,3.0\n");
        assert_eq!(csv.headers(), &["source_id", "ra", "dec"]);
        let data = collect(csv);
        assert_eq!(data, vec![vec!["1", "10.5", "-5.25"], vec!["2", "11.0", "3.0"]]);
    }

    #[test]
    fn test_ecsv_metadata_and_crlf() {
        let csv = rows("# %ECSV 1.0\n# ---\nsource_id,ra\r\n7,1.5\r\n\n8,2.5\r\n");
        assert_eq!(csv.headers(), &["source_id", "ra"]);
        assert_eq!(collect(csv), vec![vec!["7", "1.5"], vec!["8", "2.5"]]);
    }

    #[test]
    fn test_empty_fields_kept() {
        let csv = rows("a,b,c\n1,,3\n,,\n");
        assert_eq!(collect(csv), vec![vec!["1", "", "3"], vec!["", "", ""]]);
    }

    #[test]
    fn test_quoted_fields() {
        let csv = rows("designation,flag\n\"Gaia DR2 4295806720\",\"NOT_AVAILABLE\"\n\"a,b\",x\n");
        assert_eq!(
            collect(csv),
            vec![
                vec!["Gaia DR2 4295806720", "NOT_AVAILABLE"],
                vec!["a,b", "x"]
            ]
        );
    }

    #[test]
    fn test_column_indices() {
        let csv = rows("solution_id,source_id,ra,dec\n");
        assert_eq!(csv.column_indices(&["dec", "source_id"]).unwrap(), vec![3, 1]);

        match csv.column_indices(&["ra", "phot_g_mean_mag"]).unwrap_err() {
            MiniGaiaError::MissingColumn { column, file } => {
                assert_eq!(column, "phot_g_mean_mag");
                assert_eq!(file, PathBuf::from("test.csv"));
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_field_count_mismatch() {
        let mut csv = rows("a,b\n1,2\n3\n");
        assert!(csv.next_row().unwrap().is_some());
        let err = csv.next_row().unwrap_err();
        assert!(err.to_string().contains("line 3 has 1 fields"), "{}", err);
    }

    #[test]
    fn test_no_header() {
        let result = CsvRows::new(Cursor::new(b"# only comments\n".to_vec()), "empty.csv");
        assert!(matches!(result, Err(MiniGaiaError::InvalidCsv { .. })));
    }

    #[test]
    fn test_rows_read() {
        let mut csv = rows("a\n1\n2\n3\n");
        while csv.next_row().unwrap().is_some() {}
        assert_eq!(csv.rows_read(), 3);
    }
}
