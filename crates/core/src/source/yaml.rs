//! YAML adapter for the legacy plugin's configuration file.
//!
//! Reads a `config.yml` of the shape
//!
//! ```yaml
//! groups:
//!   admin:
//!     permissions:
//!       core.fly: true
//!     inheritance:
//!     - default
//! users:
//!   069a79f4-44e9-4726-a5be-fca90e38aaf5:
//!     groups:
//!     - admin
//! ```
//!
//! into a [`SourceTree`]. Mapping order is preserved. Non-boolean scalars are
//! carried in string form; null values and non-scalar mapping keys are
//! dropped.

use std::path::PathBuf;

use serde_yaml::Value;
use tracing::{debug, info};

use super::tree::{ConfigSection, ConfigValue, SourceTree};
use super::SourceProvider;
use crate::errors::SourceError;

/// File-backed YAML source.
pub struct YamlSource {
    path: PathBuf,
}

impl YamlSource {
    /// Create a source reading from the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceProvider for YamlSource {
    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<SourceTree, SourceError> {
        if !self.is_available() {
            return Err(SourceError::Unavailable);
        }

        info!(path = %self.path.display(), "loading legacy configuration");
        let raw = std::fs::read_to_string(&self.path)?;
        let doc: Value =
            serde_yaml::from_str(&raw).map_err(|e| SourceError::ParseError(e.to_string()))?;

        let root = match convert(&doc) {
            Some(ConfigValue::Section(root)) => root,
            _ => return Err(SourceError::NotAMapping),
        };

        let tree = SourceTree::from_root(root);
        debug!(
            groups = tree.groups.len(),
            users = tree.users.len(),
            "legacy configuration loaded"
        );
        Ok(tree)
    }
}

/// Convert a YAML value into the tree model. `None` drops the value.
fn convert(value: &Value) -> Option<ConfigValue> {
    match value {
        Value::Bool(b) => Some(ConfigValue::Bool(*b)),
        Value::String(s) => Some(ConfigValue::Str(s.clone())),
        Value::Number(n) => Some(ConfigValue::Str(n.to_string())),
        Value::Sequence(seq) => Some(ConfigValue::List(
            seq.iter().filter_map(convert).collect(),
        )),
        Value::Mapping(map) => {
            let mut section = ConfigSection::new();
            for (key, value) in map {
                if let (Some(key), Some(converted)) = (scalar_key(key), convert(value)) {
                    section.insert(key, converted);
                }
            }
            Some(ConfigValue::Section(section))
        }
        Value::Tagged(tagged) => convert(&tagged.value),
        Value::Null => None,
    }
}

/// String form of a mapping key; non-scalar keys are dropped.
fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
