//! Reader: the public face of the column-transform engine.
//!
//! A [`Reader`] consumes the header row at construction, fixes the output
//! layout, and then hands out one projected row per call to
//! [`Reader::next_row`]. It makes a single forward pass over its source.
//!
//! # Example
//!
//! ```rust
//! use chdigest::{Reader, ReaderOptions};
//!
//! let csv = "labels,id\n\"client: Foo;severity: 2\",7\n";
//! let mut reader = Reader::new(csv.as_bytes(), ReaderOptions::default()).unwrap();
//!
//! assert_eq!(reader.headers()[..3], ["id", "Client", "Severity"]);
//! let row = reader.next_row().unwrap().unwrap();
//! assert_eq!(row[2].as_deref(), Some("SV2"));
//! assert!(reader.next_row().unwrap().is_none());
//! ```

use std::collections::BTreeSet;
use std::io::Read;

use crate::error::{ReaderError, ReaderResult};
use crate::parser::{Cell, CsvSource};
use crate::transform::{ColumnPlan, RowProjector, TransformRegistry};

/// An output row, aligned to [`Reader::headers`].
pub type Row = Vec<Cell>;

/// Construction-time configuration of a [`Reader`].
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Transforms used to resolve the header row.
    pub registry: TransformRegistry,
    /// Output column names whose values are blanked in every row.
    pub omitting_values_of: BTreeSet<String>,
    /// Field delimiter of the source.
    pub delimiter: u8,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            registry: TransformRegistry::standard(),
            omitting_values_of: BTreeSet::new(),
            delimiter: b',',
        }
    }
}

impl ReaderOptions {
    pub fn with_registry(mut self, registry: TransformRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn omitting_values_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omitting_values_of
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Constructed,
    Iterating,
    Exhausted,
}

/// Reads a CSV source and yields rows in the output layout.
pub struct Reader<R> {
    source: CsvSource<R>,
    projector: RowProjector,
    registry: TransformRegistry,
    omitting_values_of: BTreeSet<String>,
    state: ReaderState,
    rows_read: usize,
}

impl<R: Read> Reader<R> {
    /// Read the header row from `source` and build the column plan.
    pub fn new(source: R, options: ReaderOptions) -> ReaderResult<Self> {
        let mut source = CsvSource::new(source, options.delimiter);
        let headers = source.read_header()?.ok_or(ReaderError::MissingHeader)?;
        let plan = ColumnPlan::build(headers.as_slice(), &options.registry)?;
        let projector = RowProjector::omitting(plan, &options.omitting_values_of);

        Ok(Self {
            source,
            projector,
            registry: options.registry,
            omitting_values_of: options.omitting_values_of,
            state: ReaderState::Constructed,
            rows_read: 0,
        })
    }

    /// Output column names. Fixed at construction.
    pub fn headers(&self) -> &[String] {
        self.projector.headers()
    }

    /// The header row as it appeared in the source.
    pub fn input_headers(&self) -> &[String] {
        self.projector.plan().input_headers()
    }

    pub fn plan(&self) -> &ColumnPlan {
        self.projector.plan()
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Output column names whose values are blanked.
    pub fn omitting_values_of(&self) -> &BTreeSet<String> {
        &self.omitting_values_of
    }

    /// Data rows returned so far.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ReaderState::Exhausted
    }

    /// Read and project the next row.
    ///
    /// Returns `Ok(None)` at end of input and on every call after it. An
    /// error also ends the pass.
    pub fn next_row(&mut self) -> ReaderResult<Option<Row>> {
        if self.state == ReaderState::Exhausted {
            return Ok(None);
        }
        self.state = ReaderState::Iterating;

        let result = self
            .source
            .read_row()
            .map_err(ReaderError::from)
            .and_then(|raw| match raw {
                Some(raw) => self.projector.project(&raw.cells, raw.line).map(Some),
                None => Ok(None),
            });

        match result {
            Ok(Some(row)) => {
                self.rows_read += 1;
                Ok(Some(row))
            }
            other => {
                self.state = ReaderState::Exhausted;
                other
            }
        }
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = ReaderResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
