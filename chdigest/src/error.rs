//! Error types for the chdigest conversion pipeline.
//!
//! One enum per layer:
//!
//! - [`CsvError`] - decoding and CSV syntax errors
//! - [`RegistryError`] - invalid or unreadable transform registries
//! - [`PlanError`] - header rows that cannot be resolved into a plan
//! - [`ReaderError`] - failures while reading and projecting rows
//! - [`ConfigError`] - invalid run options
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while decoding or tokenizing CSV input and output.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read or write the underlying stream.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV syntax.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors raised while building or loading a transform registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two specified outputs share a rank.
    #[error("Rank {rank} is used by both '{first}' and '{second}'")]
    DuplicateRank {
        rank: usize,
        first: String,
        second: String,
    },

    /// Two registry keys collide once lowercased.
    #[error("Column '{0}' is registered more than once")]
    DuplicateColumn(String),

    /// A registered column produces no outputs.
    #[error("Column '{0}' has an empty transform")]
    EmptySpec(String),

    /// IO error.
    #[error("Registry IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Registry JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Plan Errors
// =============================================================================

/// Errors raised while resolving a header row into a column plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Two input columns resolve to the same registry entry.
    #[error("Columns {first_index} and {second_index} both resolve to '{name}'")]
    DuplicateRecognizedColumn {
        name: String,
        first_index: usize,
        second_index: usize,
    },
}

// =============================================================================
// Reader Errors
// =============================================================================

/// Errors raised by [`crate::Reader`].
#[derive(Debug, Error)]
pub enum ReaderError {
    /// CSV error from the row source.
    #[error(transparent)]
    Csv(#[from] CsvError),

    /// The header row could not be planned.
    #[error("Invalid header row: {0}")]
    Plan(#[from] PlanError),

    /// The source has no header row.
    #[error("No header row found in CSV")]
    MissingHeader,

    /// A data row does not have one cell per header column.
    #[error("Line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in run options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An options file could not be read.
    #[error("Cannot read options file '{}': {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An options file is not valid JSON for the options schema.
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// The transform registry could not be loaded.
    #[error("Invalid registry: {0}")]
    Registry(#[from] RegistryError),

    /// Delimiters must be single-byte characters.
    #[error("Delimiter '{0}' is not a single-byte character")]
    InvalidDelimiter(char),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::digest_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid run options.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Reading or projecting a row failed.
    #[error("Conversion failed: {0}")]
    Reader(#[from] ReaderError),

    /// The finished output could not be moved into place.
    #[error("Cannot write '{}': {source}", .path.display())]
    Commit {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the failure stems from how the tool was invoked rather
    /// than from the data it was given.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, PipelineError::Config(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for plan construction.
pub type PlanResult<T> = Result<T, PlanError>;

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
