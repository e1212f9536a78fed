//! Transform registry
//!
//! Maps recognized input column names to the output columns they produce.
//! The registry is an explicit value: build [`TransformRegistry::standard`]
//! or load one from JSON, then hand it to [`super::ColumnPlan::build`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::extract::Extractor;
use crate::error::{RegistryError, RegistryResult};

/// Ordering key of an output column within its group.
pub type Rank = usize;

/// One output column produced by a recognized input column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformItem {
    /// Position among all specified output columns
    pub rank: Rank,

    /// Name of the output column
    pub output_name: String,

    /// How the output value is derived from the input cell
    #[serde(default, skip_serializing_if = "Extractor::is_identity")]
    pub extractor: Extractor,
}

impl TransformItem {
    pub fn new(rank: Rank, output_name: &str, extractor: Extractor) -> Self {
        Self {
            rank,
            output_name: output_name.to_string(),
            extractor,
        }
    }

    pub fn identity(rank: Rank, output_name: &str) -> Self {
        Self::new(rank, output_name, Extractor::Identity)
    }
}

/// Ordered outputs of one recognized input column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnTransformSpec {
    items: Vec<TransformItem>,
}

impl ColumnTransformSpec {
    pub fn new(items: Vec<TransformItem>) -> Self {
        Self { items }
    }

    /// A spec copying the column to a single output of the same name.
    pub fn identity(rank: Rank, name: &str) -> Self {
        Self::new(vec![TransformItem::identity(rank, name)])
    }

    pub fn items(&self) -> &[TransformItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Registered transforms keyed by lowercased input column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransformRegistry {
    specs: BTreeMap<String, ColumnTransformSpec>,
}

/// Columns copied one-to-one, with their ranks.
const IDENTITY_COLUMNS: [(Rank, &str); 12] = [
    (1, "id"),
    (2, "name"),
    (3, "type"),
    (6, "created_at"),
    (7, "started_at"),
    (8, "completed_at"),
    (9, "state"),
    (10, "epic"),
    (11, "project"),
    (16, "requester"),
    (17, "owners"),
    (18, "description"),
];

/// Input column decomposed into several outputs.
pub const LABELS_COLUMN: &str = "labels";

impl TransformRegistry {
    /// Create an empty registry: every column passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// The column layout for story-tracker exports.
    pub fn standard() -> Self {
        let mut specs: BTreeMap<String, ColumnTransformSpec> = IDENTITY_COLUMNS
            .iter()
            .map(|&(rank, name)| (name.to_string(), ColumnTransformSpec::identity(rank, name)))
            .collect();

        specs.insert(
            LABELS_COLUMN.to_string(),
            ColumnTransformSpec::new(vec![
                TransformItem::new(4, "Client", Extractor::subfield("client")),
                TransformItem::new(5, "Severity", Extractor::Severity),
                TransformItem::new(12, "agency", Extractor::subfield("agency")),
                TransformItem::new(13, "source", Extractor::subfield("Source")),
                TransformItem::new(14, "Cause", Extractor::subfield("Cause")),
                TransformItem::new(15, "layer", Extractor::subfield("layer")),
            ]),
        );

        Self { specs }
    }

    /// Build a registry from `(column name, spec)` pairs.
    ///
    /// Names are lowercased; collisions, empty specs and shared ranks are rejected.
    pub fn from_specs<I, S>(specs: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = (S, ColumnTransformSpec)>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for (name, spec) in specs {
            registry.register(name.as_ref(), spec)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    /// Parse a registry from a JSON object of column name to output list
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let raw: BTreeMap<String, ColumnTransformSpec> = serde_json::from_str(json)?;
        Self::from_specs(raw)
    }

    /// Load a registry from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn register(&mut self, name: &str, spec: ColumnTransformSpec) -> RegistryResult<()> {
        if spec.is_empty() {
            return Err(RegistryError::EmptySpec(name.to_string()));
        }
        let key = name.to_lowercase();
        if self.specs.contains_key(&key) {
            return Err(RegistryError::DuplicateColumn(key));
        }
        self.specs.insert(key, spec);
        Ok(())
    }

    /// Check that no two specified outputs share a rank.
    pub fn validate(&self) -> RegistryResult<()> {
        let mut seen: HashMap<Rank, &str> = HashMap::new();
        for item in self.specs.values().flat_map(|spec| spec.items()) {
            if let Some(first) = seen.insert(item.rank, &item.output_name) {
                return Err(RegistryError::DuplicateRank {
                    rank: item.rank,
                    first: first.to_string(),
                    second: item.output_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Find the transform for an input column, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&ColumnTransformSpec> {
        self.specs.get(&name.to_lowercase())
    }

    /// Every output name the registry can produce, in rank order.
    pub fn output_names(&self) -> Vec<&str> {
        let mut items: Vec<&TransformItem> =
            self.specs.values().flat_map(|spec| spec.items()).collect();
        items.sort_by_key(|item| item.rank);
        items.iter().map(|item| item.output_name.as_str()).collect()
    }

    /// Registered input column names, lowercased.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_valid() {
        let registry = TransformRegistry::standard();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn test_standard_output_order() {
        let registry = TransformRegistry::standard();
        assert_eq!(
            registry.output_names(),
            vec![
                "id", "name", "type", "Client", "Severity", "created_at", "started_at",
                "completed_at", "state", "epic", "project", "agency", "source", "Cause",
                "layer", "requester", "owners", "description",
            ]
        );
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = TransformRegistry::standard();
        let lower = registry.lookup("name").unwrap();
        assert_eq!(registry.lookup("Name"), Some(lower));
        assert_eq!(registry.lookup("NAME"), Some(lower));
        assert_eq!(registry.lookup("LABELS").unwrap().len(), 6);
        assert!(registry.lookup("unspec").is_none());
    }

    #[test]
    fn test_identity_columns_map_to_themselves() {
        let registry = TransformRegistry::standard();
        for (_, name) in IDENTITY_COLUMNS {
            let spec = registry.lookup(name).unwrap();
            assert_eq!(spec.len(), 1);
            assert_eq!(spec.items()[0].output_name, name);
            assert!(spec.items()[0].extractor.is_identity());
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "Ticket": [{"rank": 1, "outputName": "ticket"}],
            "tags": [
                {"rank": 2, "outputName": "Team", "extractor": {"type": "subfield", "key": "team"}},
                {"rank": 3, "outputName": "Severity", "extractor": {"type": "severity"}}
            ]
        }"#;
        let registry = TransformRegistry::from_json(json).unwrap();

        assert_eq!(registry.output_names(), vec!["ticket", "Team", "Severity"]);
        let ticket = registry.lookup("TICKET").unwrap();
        assert!(ticket.items()[0].extractor.is_identity());
    }

    #[test]
    fn test_json_round_trip_of_standard() {
        let registry = TransformRegistry::standard();
        let parsed = TransformRegistry::from_json(&registry.to_json().unwrap()).unwrap();
        assert_eq!(parsed, registry);
    }

    #[test]
    fn test_duplicate_rank_rejected() {
        let result = TransformRegistry::from_specs([
            ("a", ColumnTransformSpec::identity(1, "a")),
            ("b", ColumnTransformSpec::identity(1, "b")),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicateRank { rank: 1, .. })));
    }

    #[test]
    fn test_case_colliding_names_rejected() {
        let result = TransformRegistry::from_json(
            r#"{"Id": [{"rank": 1, "outputName": "id"}], "id": [{"rank": 2, "outputName": "id2"}]}"#,
        );
        assert!(matches!(result, Err(RegistryError::DuplicateColumn(name)) if name == "id"));
    }

    #[test]
    fn test_empty_spec_rejected() {
        let result = TransformRegistry::from_json(r#"{"id": []}"#);
        assert!(matches!(result, Err(RegistryError::EmptySpec(_))));
    }
}
