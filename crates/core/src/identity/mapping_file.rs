//! TOML-based identity mapping file reader.
//!
//! The mapping file format:
//!
//! ```toml
//! [users]
//! Notch = "069a79f4-44e9-4726-a5be-fca90e38aaf5"
//! alice = "d4d8d3a4-5c4c-4b85-a0a3-8f3fbc5c0c3d"
//! ```
//!
//! Keys are matched case-insensitively at lookup time, so they are folded to
//! lowercase on load.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::IdentityError;

/// Wrapper around the TOML mapping file structure.
#[derive(Debug, Clone, Deserialize, Default)]
struct MappingFileData {
    /// The `[users]` table mapping legacy key -> unique id.
    #[serde(default)]
    users: HashMap<String, Uuid>,
}

/// Utilities for loading the identity mapping file.
pub struct MappingFile;

impl MappingFile {
    /// Load the mapping file from disk and return the lowercased key map.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Uuid>, IdentityError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading identity mapping file");

        if !path.exists() {
            return Err(IdentityError::MappingFileError {
                path: path.display().to_string(),
                detail: "file not found".into(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(IdentityError::IoError)?;
        let data: MappingFileData =
            toml::from_str(&contents).map_err(|e| IdentityError::ParseError(e.to_string()))?;

        let entries: HashMap<String, Uuid> = data
            .users
            .into_iter()
            .map(|(key, id)| (key.to_lowercase(), id))
            .collect();

        debug!(count = entries.len(), "loaded user id mappings");
        Ok(entries)
    }
}
