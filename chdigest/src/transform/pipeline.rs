//! High-level pipeline API: one CSV file in, one CSV file out.
//!
//! # Example
//!
//! ```rust,no_run
//! use chdigest::{digest_file, DigestOptions};
//! use std::path::Path;
//!
//! let summary = digest_file(
//!     Path::new("stories.csv"),
//!     Path::new("digest.csv"),
//!     &DigestOptions::default(),
//! )?;
//! println!("Wrote {} rows", summary.rows);
//! # Ok::<(), chdigest::PipelineError>(())
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::DigestOptions;
use crate::error::{PipelineError, PipelineResult};
use crate::parser::{decode_auto, CsvSink};
use crate::reader::{Reader, ReaderOptions};

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct DigestSummary {
    /// Output header row
    pub headers: Vec<String>,

    /// Data rows written
    pub rows: usize,

    /// Detected input encoding
    pub encoding: String,

    /// Where the output was committed
    pub destination: PathBuf,
}

/// Convert `source` into `sink`: the output header, then one row per input row.
///
/// Returns the number of data rows written. The first failing row aborts
/// the conversion.
pub fn digest<R: Read, W: Write>(
    source: R,
    sink: W,
    options: ReaderOptions,
) -> PipelineResult<usize> {
    let delimiter = options.delimiter;
    let mut reader = Reader::new(source, options)?;
    warn_unknown_omissions(&reader);

    write_rows(&mut reader, sink, delimiter)?.flush()?;

    Ok(reader.rows_read())
}

/// Write the output header, then every remaining row of `reader`, to `sink`.
fn write_rows<R: Read, W: Write>(
    reader: &mut Reader<R>,
    sink: W,
    delimiter: u8,
) -> PipelineResult<W> {
    let mut writer = CsvSink::new(sink, delimiter);
    writer.write_header(reader.headers())?;
    while let Some(row) = reader.next_row()? {
        writer.write_row(&row)?;
    }
    Ok(writer.finish()?)
}

/// Convert the CSV file at `source` into a new CSV file at `dest`.
///
/// The output is written to a temporary file next to `dest` and moved into
/// place only once every row has been written, so a failed run leaves
/// `dest` untouched.
pub fn digest_file(
    source: &Path,
    dest: &Path,
    options: &DigestOptions,
) -> PipelineResult<DigestSummary> {
    let reader_options = options.resolve()?;
    let delimiter = reader_options.delimiter;

    info!(source = %source.display(), "reading CSV");
    let bytes = fs::read(source)?;
    let input = decode_auto(&bytes)?;
    debug!(encoding = %input.encoding, bytes = bytes.len(), "decoded input");

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = NamedTempFile::new_in(dir)?;

    let mut reader = Reader::new(input.content.as_bytes(), reader_options)?;
    warn_unknown_omissions(&reader);
    let headers = reader.headers().to_vec();
    info!(
        input_columns = reader.input_headers().len(),
        output_columns = headers.len(),
        "resolved column plan"
    );

    let staging = write_rows(&mut reader, staging, delimiter)?;
    staging.as_file().sync_all()?;

    staging
        .persist(dest)
        .map_err(|e| PipelineError::Commit {
            path: dest.to_path_buf(),
            source: e.error,
        })?;

    let rows = reader.rows_read();
    info!(rows, destination = %dest.display(), "wrote CSV");

    Ok(DigestSummary {
        headers,
        rows,
        encoding: input.encoding,
        destination: dest.to_path_buf(),
    })
}

/// Omitted names are matched against output names, so a name that neither
/// the registry nor this file's header can produce is almost surely a typo.
fn warn_unknown_omissions<R: Read>(reader: &Reader<R>) {
    let known: BTreeSet<&str> = reader
        .registry()
        .output_names()
        .into_iter()
        .chain(reader.input_headers().iter().map(String::as_str))
        .collect();

    let present: BTreeSet<&str> = reader.headers().iter().map(String::as_str).collect();
    for name in reader.omitting_values_of() {
        if !known.contains(name.as_str()) {
            warn!(column = %name, "omitted column is never produced");
        } else if !present.contains(name.as_str()) {
            debug!(column = %name, "omitted column is not present in this file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;

    fn run(csv: &str, options: ReaderOptions) -> PipelineResult<(usize, String)> {
        let mut out = Vec::new();
        let rows = digest(csv.as_bytes(), &mut out, options)?;
        Ok((rows, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn test_digest_in_memory() {
        let csv = "labels,created_at,id,owners\n\"client: Foo;agency: Bar\",123,456,789\n";
        let (rows, out) = run(csv, ReaderOptions::default()).unwrap();

        assert_eq!(rows, 1);
        assert_eq!(
            out,
            "id,Client,Severity,created_at,agency,source,Cause,layer,owners\n\
             456,Foo,,123,Bar,,,,789\n"
        );
    }

    #[test]
    fn test_digest_keeps_passthrough_values() {
        let csv = "notes,id\n\"multi\nline, quoted\",1\n";
        let (_, out) = run(csv, ReaderOptions::default()).unwrap();
        assert_eq!(out, "id,notes\n1,\"multi\nline, quoted\"\n");
    }

    #[test]
    fn test_digest_with_semicolons() {
        let options = ReaderOptions::default().with_delimiter(b';');
        let (_, out) = run("name;id\nx;1\n", options).unwrap();
        assert_eq!(out, "id;name\n1;x\n");
    }

    #[test]
    fn test_digest_aborts_on_malformed_row() {
        let result = run("id,name\n1,a\n2\n", ReaderOptions::default());
        assert!(matches!(
            result,
            Err(PipelineError::Reader(ReaderError::MalformedRow { line: 3, .. }))
        ));
    }

    #[test]
    fn test_digest_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let dest = dir.path().join("out.csv");
        fs::write(&source, "id,name,unspec,description\n123,foo,bar,baz\n").unwrap();

        let options = DigestOptions {
            omitting_values_of: vec!["description".into()],
            ..DigestOptions::default()
        };
        let summary = digest_file(&source, &dest, &options).unwrap();

        assert_eq!(summary.rows, 1);
        assert_eq!(summary.headers, ["id", "name", "description", "unspec"]);
        assert_eq!(summary.encoding, "utf-8");
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "id,name,description,unspec\n123,foo,,bar\n"
        );
    }

    #[test]
    fn test_digest_file_latin1_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let dest = dir.path().join("out.csv");
        let mut bytes = b"name,id\n".to_vec();
        bytes.extend_from_slice(&[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9]);
        bytes.extend_from_slice(b",1\n");
        fs::write(&source, bytes).unwrap();

        let summary = digest_file(&source, &dest, &DigestOptions::default()).unwrap();
        assert_ne!(summary.encoding, "utf-8");
        let out = fs::read_to_string(&dest).unwrap();
        assert!(out.starts_with("id,name\n1,Soci"));
    }

    #[test]
    fn test_failed_run_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let dest = dir.path().join("out.csv");
        fs::write(&source, "id,name\n1,a\n2,b,c\n").unwrap();

        let result = digest_file(&source, &dest, &DigestOptions::default());
        assert!(matches!(result, Err(PipelineError::Reader(_))));
        assert!(!dest.exists());
        // Only the source remains; the staging file was cleaned up
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_run_keeps_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let dest = dir.path().join("out.csv");
        fs::write(&source, "id\n1,2\n").unwrap();
        fs::write(&dest, "previous\n").unwrap();

        assert!(digest_file(&source, &dest, &DigestOptions::default()).is_err());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "previous\n");
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = digest_file(
            &dir.path().join("absent.csv"),
            &dir.path().join("out.csv"),
            &DigestOptions::default(),
        );
        assert!(matches!(result, Err(PipelineError::IoError(_))));
    }
}
