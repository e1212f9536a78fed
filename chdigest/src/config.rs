//! Run options.
//!
//! [`DigestOptions`] is the serializable form read from an options file and
//! the command line; [`DigestOptions::resolve`] turns it into the
//! [`ReaderOptions`] the engine consumes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::reader::ReaderOptions;
use crate::transform::TransformRegistry;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Options for a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DigestOptions {
    /// Output columns whose values are blanked
    pub omitting_values_of: Vec<String>,

    /// JSON registry to use instead of the standard one
    pub registry: Option<PathBuf>,

    /// Field delimiter for input and output
    pub delimiter: char,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            omitting_values_of: Vec::new(),
            registry: None,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl DigestOptions {
    /// Parse options from a JSON string
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// The delimiter as a byte.
    pub fn delimiter_byte(&self) -> ConfigResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::InvalidDelimiter(self.delimiter))
        }
    }

    /// Load the registry and build reader options.
    pub fn resolve(&self) -> ConfigResult<ReaderOptions> {
        let registry = match &self.registry {
            Some(path) => TransformRegistry::load(path)?,
            None => TransformRegistry::standard(),
        };

        Ok(ReaderOptions::default()
            .with_registry(registry)
            .omitting_values_of(self.omitting_values_of.iter().cloned())
            .with_delimiter(self.delimiter_byte()?))
    }
}
