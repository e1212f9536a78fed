//! CSV row source and sink with encoding auto-detection.
//!
//! Rows are handed out as positional cells. An empty field reads as `None`
//! and `None` is written back as an empty field. No column logic here.

use std::io::{Read, Write};

use crate::error::{CsvError, CsvResult};

/// One cell of a row; `None` for an empty field.
pub type Cell = Option<String>;

/// A data row as read from the source, with its position for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number where the record starts.
    pub line: u64,
    /// Cells in input column order.
    pub cells: Vec<Cell>,
}

/// Input text after encoding detection.
#[derive(Debug, Clone)]
pub struct DecodedInput {
    /// UTF-8 content, without a byte order mark.
    pub content: String,
    /// Detected encoding.
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
///
/// Encodings `encoding_rs` does not know fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        // Every byte maps to a character, so single-byte decoding cannot fail
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    })
}

/// Decode `bytes` to UTF-8, detecting the encoding unless they already are UTF-8.
pub fn decode_auto(bytes: &[u8]) -> CsvResult<DecodedInput> {
    let encoding = match std::str::from_utf8(bytes) {
        Ok(_) => "utf-8".to_string(),
        // Not UTF-8 whatever chardet guesses; assume a Western single-byte charset
        Err(_) => match detect_encoding(bytes).as_str() {
            "utf-8" => "windows-1252".to_string(),
            other => other.to_string(),
        },
    };
    let content = decode_content(bytes, &encoding)?;
    Ok(DecodedInput { content, encoding })
}

/// Pulls records one at a time from a CSV stream.
///
/// Records of any width are accepted; checking widths against the header
/// is the caller's job.
pub struct CsvSource<R> {
    inner: csv::Reader<R>,
    record: csv::StringRecord,
}

impl<R: Read> CsvSource<R> {
    pub fn new(reader: R, delimiter: u8) -> Self {
        let inner = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);
        Self {
            inner,
            record: csv::StringRecord::new(),
        }
    }

    /// Read the header row, if the source has one.
    pub fn read_header(&mut self) -> CsvResult<Option<Vec<String>>> {
        if !self.inner.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }

    /// Read the next data row, or `None` at end of input.
    pub fn read_row(&mut self) -> CsvResult<Option<RawRow>> {
        if !self.inner.read_record(&mut self.record)? {
            return Ok(None);
        }
        let line = self.record.position().map(|p| p.line()).unwrap_or(0);
        let cells = self
            .record
            .iter()
            .map(|field| (!field.is_empty()).then(|| field.to_string()))
            .collect();
        Ok(Some(RawRow { line, cells }))
    }
}

/// Writes header and data rows to a CSV stream.
pub struct CsvSink<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W, delimiter: u8) -> Self {
        let inner = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .from_writer(writer);
        Self { inner }
    }

    pub fn write_header<S: AsRef<str>>(&mut self, names: &[S]) -> CsvResult<()> {
        self.inner
            .write_record(names.iter().map(|name| name.as_ref()))?;
        Ok(())
    }

    pub fn write_row(&mut self, cells: &[Cell]) -> CsvResult<()> {
        self.inner
            .write_record(cells.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        Ok(())
    }

    /// Flush buffered records and hand back the underlying writer.
    pub fn finish(self) -> CsvResult<W> {
        self.inner
            .into_inner()
            .map_err(|e| CsvError::IoError(e.into_error()))
    }
}
