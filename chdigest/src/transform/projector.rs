//! Row projection
//!
//! Turns one input row into one output row: every cell is projected through
//! its plan entry, the keyed values are sorted by `(group, rank)` and the
//! keys are dropped.

use std::collections::BTreeSet;

use super::plan::{ColumnPlan, OutputKey};
use crate::error::{ReaderError, ReaderResult};
use crate::parser::Cell;

/// Applies a [`ColumnPlan`] to data rows.
#[derive(Debug, Clone)]
pub struct RowProjector {
    plan: ColumnPlan,
    /// Per output position: blank the value.
    omitted: Vec<bool>,
}

impl RowProjector {
    pub fn new(plan: ColumnPlan) -> Self {
        Self::omitting(plan, &BTreeSet::new())
    }

    /// Blank every output column whose name is in `omitting_values_of`.
    ///
    /// Names are matched against output names, case-sensitively. The columns
    /// stay in the header.
    pub fn omitting(plan: ColumnPlan, omitting_values_of: &BTreeSet<String>) -> Self {
        let omitted = plan
            .output_headers()
            .iter()
            .map(|name| omitting_values_of.contains(name))
            .collect();
        Self { plan, omitted }
    }

    pub fn plan(&self) -> &ColumnPlan {
        &self.plan
    }

    pub fn headers(&self) -> &[String] {
        self.plan.output_headers()
    }

    /// Project one row. `line` is only used for error reporting.
    pub fn project(&self, cells: &[Cell], line: u64) -> ReaderResult<Vec<Cell>> {
        let expected = self.plan.input_width();
        if cells.len() != expected {
            return Err(ReaderError::MalformedRow {
                line,
                expected,
                found: cells.len(),
            });
        }

        let mut keyed: Vec<(OutputKey, Cell)> = self
            .plan
            .entries()
            .iter()
            .zip(cells)
            .enumerate()
            .flat_map(|(i, (entry, cell))| entry.project(cell.as_deref(), i))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(keyed
            .into_iter()
            .zip(&self.omitted)
            .map(|((_, value), &omit)| if omit { None } else { value })
            .collect())
    }
}
