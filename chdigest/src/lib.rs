//! # chdigest - story-tracker CSV digests
//!
//! chdigest rewrites a CSV export into a fixed column layout: known columns
//! are renamed and ordered, the composite `labels` column is split into its
//! subfields, and every other column is kept, unchanged, after them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│ Column plan │────▶│  CSV File   │
//! │ (any enc.)  │     │  (decode)   │     │ + projector │     │  (UTF-8)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chdigest::{Reader, ReaderOptions};
//!
//! let csv = "name,id,notes\nFix login,42,urgent\n";
//! let mut reader = Reader::new(csv.as_bytes(), ReaderOptions::default()).unwrap();
//!
//! assert_eq!(reader.headers(), ["id", "name", "notes"]);
//! let row = reader.next_row().unwrap().unwrap();
//! assert_eq!(row[0].as_deref(), Some("42"));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`parser`] - CSV source/sink and encoding detection
//! - [`transform`] - Registry, plan, projector and pipeline
//! - [`reader`] - Row-at-a-time reader
//! - [`config`] - Run options
//! - [`logging`] - Subscriber setup for the binary

// Core modules
pub mod error;

// Parsing
pub mod parser;

// Transformation
pub mod reader;
pub mod transform;

// Options and logging
pub mod config;
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, CsvError, PipelineError, PlanError, ReaderError, RegistryError,
};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use transform::{
    ColumnPlan,
    ColumnPlanEntry,
    ColumnTransformSpec,
    Extractor,
    OutputKey,
    RankingGroup,
    RowProjector,
    TransformItem,
    TransformRegistry,
};

pub use reader::{Reader, ReaderOptions, Row};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use config::DigestOptions;
pub use transform::pipeline::{digest, digest_file, DigestSummary};
