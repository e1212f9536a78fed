//! Column-transform engine.
//!
//! - Registry: recognized input columns and the outputs they produce
//! - Extract: per-cell extractors (identity, subfields, severity)
//! - Plan: header row resolved into an ordered output layout
//! - Projector: data rows reordered into that layout
//! - Pipeline: file-to-file conversion

pub mod extract;
pub mod pipeline;
pub mod plan;
pub mod projector;
pub mod registry;

pub use extract::{extract_subfield, Extractor};
pub use pipeline::{digest, digest_file, DigestSummary};
pub use plan::{ColumnPlan, ColumnPlanEntry, OutputKey, RankingGroup};
pub use projector::RowProjector;
pub use registry::{ColumnTransformSpec, Rank, TransformItem, TransformRegistry};
