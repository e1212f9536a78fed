//! Value extractors
//!
//! Pure functions applied to a single cell when a recognized column is
//! projected. Every extractor is total: a missing cell or a composite
//! value without the wanted subfield yields `None`, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `;` plus any ASCII whitespace that follows it.
static PART_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";(?-u:\s)*").expect("valid regex"));

/// `:` plus any ASCII whitespace that follows it.
static KEY_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(?-u:\s)*").expect("valid regex"));

/// Prefix written in front of severity levels.
pub const SEVERITY_PREFIX: &str = "SV";

/// Subkey holding the severity level inside a composite labels value.
pub const SEVERITY_SUBKEY: &str = "severity";

/// All available extractors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Extractor {
    /// Copy the value unchanged
    #[default]
    Identity,

    /// Pick one `key: value` component out of a `;`-separated list.
    /// The key is matched case-sensitively.
    Subfield { key: String },

    /// The `severity` subfield, formatted as `SV<level>`
    Severity,
}

impl Extractor {
    pub fn subfield(key: impl Into<String>) -> Self {
        Extractor::Subfield { key: key.into() }
    }

    /// Apply this extractor to a cell
    pub fn apply(&self, value: Option<&str>) -> Option<String> {
        match self {
            Extractor::Identity => value.map(str::to_string),
            Extractor::Subfield { key } => value
                .and_then(|v| extract_subfield(v, key))
                .map(str::to_string),
            Extractor::Severity => value
                .and_then(|v| extract_subfield(v, SEVERITY_SUBKEY))
                .map(|level| format!("{}{}", SEVERITY_PREFIX, level)),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Extractor::Identity)
    }
}

/// Find the value of `key` in a composite like `client: Foo;agency: Bar`.
///
/// Only the first component whose key matches is considered; if that
/// component has no `:` there is no value.
pub fn extract_subfield<'a>(composite: &'a str, key: &str) -> Option<&'a str> {
    PART_SEPARATOR
        .split(composite)
        .map(|part| {
            let mut pieces = KEY_SEPARATOR.splitn(part, 2);
            (pieces.next().unwrap_or(""), pieces.next())
        })
        .find(|(subkey, _)| *subkey == key)
        .and_then(|(_, subvalue)| subvalue)
}
