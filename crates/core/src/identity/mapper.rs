//! Core identity resolution logic.
//!
//! [`MappingResolver`] translates raw legacy user keys into unique ids:
//! UUID-shaped keys resolve directly, everything else goes through an
//! optional mapping file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::mapping_file::MappingFile;
use super::IdentityResolver;
use crate::errors::IdentityError;

/// Identity resolver backed by an optional TOML mapping file.
///
/// Thread-safe: the mapping cache is wrapped in an `RwLock` so lookups can
/// run concurrently and `reload()` can update it.
pub struct MappingResolver {
    /// Cached lowercased legacy key -> unique id mapping.
    cache: RwLock<HashMap<String, Uuid>>,
    /// Path to the TOML mapping file (if any).
    mapping_file_path: Option<PathBuf>,
}

impl MappingResolver {
    /// Create a resolver with no mapping file. Only UUID-shaped keys will
    /// resolve.
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            mapping_file_path: None,
        }
    }

    /// Create a resolver that also consults the given mapping file.
    ///
    /// The file is loaded immediately; a missing file starts with an empty
    /// map rather than failing, so a run can still migrate UUID-keyed users.
    pub fn with_mapping_file(path: impl Into<PathBuf>) -> Result<Self, IdentityError> {
        let path = path.into();
        let entries = if path.exists() {
            MappingFile::load(&path)?
        } else {
            warn!(path = %path.display(), "mapping file not found, starting with empty map");
            HashMap::new()
        };

        Ok(Self {
            cache: RwLock::new(entries),
            mapping_file_path: Some(path),
        })
    }

    /// Reload the mapping file from disk. Safe to call while the resolver is
    /// in use; lookups see the old data until the write lock is acquired.
    pub fn reload(&self) -> Result<(), IdentityError> {
        let path = match &self.mapping_file_path {
            Some(p) => p,
            None => {
                debug!("no mapping file to reload");
                return Ok(());
            }
        };

        let entries = MappingFile::load(path)?;
        {
            let mut cache = self.cache.write().map_err(|_| {
                IdentityError::MappingFileError {
                    path: path.display().to_string(),
                    detail: "cache lock poisoned".into(),
                }
            })?;
            *cache = entries;
        }

        info!(path = %path.display(), "identity mapping reloaded");
        Ok(())
    }
}

impl Default for MappingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver for MappingResolver {
    /// Resolve a raw legacy user key.
    ///
    /// Lookup order:
    /// 1. Parse the key itself as a UUID
    /// 2. Case-insensitive mapping-file lookup
    fn resolve_user_id(&self, raw_key: &str) -> Option<Uuid> {
        let trimmed = raw_key.trim();

        if let Ok(id) = Uuid::parse_str(trimmed) {
            debug!(key = raw_key, "key is a unique id");
            return Some(id);
        }

        let cache = self.cache.read().ok()?;
        match cache.get(&trimmed.to_lowercase()) {
            Some(id) => {
                debug!(key = raw_key, id = %id, "found in mapping file");
                Some(*id)
            }
            None => {
                debug!(key = raw_key, "no mapping for key");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_mapping(path: &std::path::Path) {
        let content = r#"
[users]
Notch = "069a79f4-44e9-4726-a5be-fca90e38aaf5"
alice = "d4d8d3a4-5c4c-4b85-a0a3-8f3fbc5c0c3d"
"#;
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_uuid_key_resolves_directly() {
        let resolver = MappingResolver::new();
        let id = resolver
            .resolve_user_id("069a79f4-44e9-4726-a5be-fca90e38aaf5")
            .unwrap();
        assert_eq!(
            id,
            Uuid::parse_str("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap()
        );
    }

    #[test]
    fn test_username_resolves_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.toml");
        write_test_mapping(&path);

        let resolver = MappingResolver::with_mapping_file(&path).unwrap();
        assert!(resolver.resolve_user_id("alice").is_some());
        // Case-insensitive.
        assert_eq!(
            resolver.resolve_user_id("notch"),
            resolver.resolve_user_id("Notch")
        );
        assert!(resolver.resolve_user_id("Notch").is_some());
    }

    #[test]
    fn test_unknown_key_is_none() {
        let resolver = MappingResolver::new();
        assert_eq!(resolver.resolve_user_id("nobody"), None);
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let resolver =
            MappingResolver::with_mapping_file(dir.path().join("absent.toml")).unwrap();
        assert_eq!(resolver.resolve_user_id("alice"), None);
    }

    #[test]
    fn test_reload_picks_up_new_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.toml");
        write_test_mapping(&path);

        let resolver = MappingResolver::with_mapping_file(&path).unwrap();
        assert_eq!(resolver.resolve_user_id("bob"), None);

        let updated = r#"
[users]
bob = "7f5f4c4e-0000-4000-8000-000000000001"
"#;
        std::fs::write(&path, updated).unwrap();

        resolver.reload().unwrap();
        assert!(resolver.resolve_user_id("bob").is_some());
    }
}
