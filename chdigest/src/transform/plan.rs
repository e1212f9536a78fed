//! Column plan
//!
//! Resolves an input header row into one [`ColumnPlanEntry`] per input
//! column and fixes the output column order once, before any data row is
//! read.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use super::registry::{ColumnTransformSpec, Rank, TransformRegistry};
use crate::error::{PlanError, PlanResult};
use crate::parser::Cell;

/// Coarse ordering partition of output columns.
///
/// Every specified column sorts before every remnant column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankingGroup {
    /// Outputs of recognized columns, ordered by registry rank.
    Specified = 1,
    /// Passthrough columns, ordered by input position.
    Remnant = 2,
}

/// Sort key of one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputKey {
    pub group: RankingGroup,
    pub rank: Rank,
}

impl OutputKey {
    pub fn specified(rank: Rank) -> Self {
        Self {
            group: RankingGroup::Specified,
            rank,
        }
    }

    pub fn remnant(input_index: usize) -> Self {
        Self {
            group: RankingGroup::Remnant,
            rank: input_index,
        }
    }
}

impl Ord for OutputKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group
            .cmp(&other.group)
            .then_with(|| self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for OutputKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How one input column contributes to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPlanEntry {
    /// A recognized column, possibly fanning out to several outputs.
    Transformed {
        input_name: String,
        spec: ColumnTransformSpec,
    },
    /// An unrecognized column, copied under its own name.
    Untransformed {
        original_name: String,
        input_index: usize,
    },
}

impl ColumnPlanEntry {
    /// The output columns this entry contributes, with their sort keys.
    pub fn describe_outputs(&self) -> Vec<(OutputKey, &str)> {
        match self {
            ColumnPlanEntry::Transformed { spec, .. } => spec
                .items()
                .iter()
                .map(|item| (OutputKey::specified(item.rank), item.output_name.as_str()))
                .collect(),
            ColumnPlanEntry::Untransformed {
                original_name,
                input_index,
            } => vec![(OutputKey::remnant(*input_index), original_name.as_str())],
        }
    }

    /// Derive this entry's output values from the cell at `input_index`.
    pub fn project(&self, value: Option<&str>, input_index: usize) -> Vec<(OutputKey, Cell)> {
        match self {
            ColumnPlanEntry::Transformed { spec, .. } => spec
                .items()
                .iter()
                .map(|item| (OutputKey::specified(item.rank), item.extractor.apply(value)))
                .collect(),
            ColumnPlanEntry::Untransformed { .. } => {
                vec![(OutputKey::remnant(input_index), value.map(str::to_string))]
            }
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self, ColumnPlanEntry::Transformed { .. })
    }
}

/// Immutable resolution of a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    entries: Vec<ColumnPlanEntry>,
    input_headers: Vec<String>,
    output_headers: Vec<String>,
}

impl ColumnPlan {
    /// Resolve `headers` against `registry`.
    ///
    /// Fails if two headers resolve to the same registered column.
    pub fn build<S: AsRef<str>>(headers: &[S], registry: &TransformRegistry) -> PlanResult<Self> {
        let mut recognized: HashMap<String, usize> = HashMap::new();
        let mut entries = Vec::with_capacity(headers.len());

        for (i, header) in headers.iter().enumerate() {
            let name = header.as_ref();
            let entry = match registry.lookup(name) {
                Some(spec) => {
                    if let Some(first_index) = recognized.insert(name.to_lowercase(), i) {
                        return Err(PlanError::DuplicateRecognizedColumn {
                            name: name.to_string(),
                            first_index,
                            second_index: i,
                        });
                    }
                    debug!(column = name, index = i, outputs = spec.len(), "recognized column");
                    ColumnPlanEntry::Transformed {
                        input_name: name.to_string(),
                        spec: spec.clone(),
                    }
                }
                None => {
                    debug!(column = name, index = i, "passthrough column");
                    ColumnPlanEntry::Untransformed {
                        original_name: name.to_string(),
                        input_index: i,
                    }
                }
            };
            entries.push(entry);
        }

        let mut outputs: Vec<(OutputKey, &str)> = entries
            .iter()
            .flat_map(ColumnPlanEntry::describe_outputs)
            .collect();
        outputs.sort_by(|a, b| a.0.cmp(&b.0));
        let output_headers = outputs.into_iter().map(|(_, name)| name.to_string()).collect();

        Ok(Self {
            input_headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            entries,
            output_headers,
        })
    }

    /// Output column names in emission order.
    pub fn output_headers(&self) -> &[String] {
        &self.output_headers
    }

    /// The header row the plan was built from.
    pub fn input_headers(&self) -> &[String] {
        &self.input_headers
    }

    /// Number of cells every data row must have.
    pub fn input_width(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ColumnPlanEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(headers: &[&str]) -> ColumnPlan {
        ColumnPlan::build(headers, &TransformRegistry::standard()).unwrap()
    }

    #[test]
    fn test_key_ordering() {
        assert!(OutputKey::specified(18) < OutputKey::remnant(0));
        assert!(OutputKey::specified(1) < OutputKey::specified(2));
        assert!(OutputKey::remnant(3) < OutputKey::remnant(7));
    }

    #[test]
    fn test_ordered_as_directed() {
        let plan = plan(&[
            "name", "id", "created_at", "started_at", "completed_at", "epic", "unspec1", "state",
            "type", "labels", "project", "unspec2", "requester", "owners", "description",
        ]);
        assert_eq!(
            plan.output_headers(),
            [
                "id", "name", "type", "Client", "Severity", "created_at", "started_at",
                "completed_at", "state", "epic", "project", "agency", "source", "Cause", "layer",
                "requester", "owners", "description", "unspec1", "unspec2",
            ]
        );
    }

    #[test]
    fn test_labels_fans_out() {
        let plan = plan(&["labels"]);
        assert_eq!(
            plan.output_headers(),
            ["Client", "Severity", "agency", "source", "Cause", "layer"]
        );
    }

    #[test]
    fn test_output_width() {
        let plan = plan(&["Labels", "id", "x", "y"]);
        assert_eq!(plan.input_width(), 4);
        assert_eq!(plan.output_headers().len(), 6 + 1 + 1 + 1);
    }

    #[test]
    fn test_resolution_ignores_case_but_keeps_passthrough_names() {
        let plan = plan(&["NAME", "Custom Field", "Id"]);
        assert_eq!(plan.output_headers(), ["id", "name", "Custom Field"]);
        assert!(plan.entries()[0].is_transformed());
        assert!(!plan.entries()[1].is_transformed());
    }

    #[test]
    fn test_passthrough_keeps_relative_order() {
        let plan = plan(&["zeta", "id", "alpha", "mid"]);
        assert_eq!(plan.output_headers(), ["id", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_duplicate_passthrough_headers_allowed() {
        let plan = plan(&["note", "id", "note"]);
        assert_eq!(plan.output_headers(), ["id", "note", "note"]);
    }

    #[test]
    fn test_duplicate_recognized_headers_rejected() {
        let result = ColumnPlan::build(&["id", "name", "ID"], &TransformRegistry::standard());
        match result {
            Err(PlanError::DuplicateRecognizedColumn {
                first_index,
                second_index,
                ..
            }) => {
                assert_eq!(first_index, 0);
                assert_eq!(second_index, 2);
            }
            other => panic!("expected duplicate column error, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_projection() {
        let registry = TransformRegistry::standard();
        let labels = ColumnPlanEntry::Transformed {
            input_name: "labels".into(),
            spec: registry.lookup("labels").unwrap().clone(),
        };
        let projected = labels.project(Some("severity: 2;layer: api"), 0);
        assert_eq!(projected.len(), 6);
        assert_eq!(projected[1], (OutputKey::specified(5), Some("SV2".to_string())));
        assert_eq!(projected[5], (OutputKey::specified(15), Some("api".to_string())));

        let remnant = ColumnPlanEntry::Untransformed {
            original_name: "x".into(),
            input_index: 4,
        };
        assert_eq!(remnant.project(None, 4), vec![(OutputKey::remnant(4), None)]);
    }

    #[test]
    fn test_empty_registry_passes_everything_through() {
        let plan = ColumnPlan::build(&["id", "labels"], &TransformRegistry::new()).unwrap();
        assert_eq!(plan.output_headers(), ["id", "labels"]);
    }
}
